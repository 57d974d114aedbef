//! 负载均衡规则协调
//!
//! 先按期望端口创建或覆盖规则（[`LoadBalancerManager::ensure_rules`]），
//! 再删除不再需要的规则（[`LoadBalancerManager::tidy_rules`]）。
//! 两步都以远程列表为准重新计算差异，不记录上一次的规则 ID。

use kce_common::{
    DesiredService, LoadBalancer, LoadBalancerRule, LoadBalancerRuleArgs, Protocol, Result,
    RuleAlgorithm, ServicePort,
};
use tracing::{debug, info};

use super::LoadBalancerManager;
use crate::pagination::list_all;

/// 健康检查超时（秒）
pub const CHECK_TIMEOUT: u32 = 5;
/// 健康检查间隔（秒）
pub const CHECK_INTERVAL: u32 = 10;
/// 判定为健康所需的连续成功次数
pub const CHECK_RISE: u32 = 1;
/// 判定为不健康所需的连续失败次数
pub const CHECK_FALL: u32 = 1;

/// 端口声明对应的固定规则参数
pub fn rule_args(port: &ServicePort) -> LoadBalancerRuleArgs {
    LoadBalancerRuleArgs {
        algorithm: RuleAlgorithm::RoundRobin,
        destination_port: port.node_port,
        listen_port: port.port,
        protocol: Protocol::Tcp,
        proxy_protocol: false,
        check_enabled: true,
        check_protocol: Protocol::Tcp,
        check_path: None,
        check_timeout: CHECK_TIMEOUT,
        check_interval: CHECK_INTERVAL,
        check_rise: CHECK_RISE,
        check_fall: CHECK_FALL,
    }
}

impl LoadBalancerManager {
    /// 列出负载均衡器的全部规则
    pub(crate) async fn list_rules(&self, balancer: &LoadBalancer) -> Result<Vec<LoadBalancerRule>> {
        list_all(|opts| self.rules.list(balancer, opts)).await
    }

    /// 按 Service 端口创建或更新规则
    ///
    /// 已存在的规则总是用完整参数覆盖，即使参数没有变化。
    /// 任一调用失败立即返回，已经应用的变更不回滚。
    pub(crate) async fn ensure_rules(&self, service: &DesiredService, balancer: &LoadBalancer) -> Result<()> {
        let rules = self.list_rules(balancer).await?;

        for port in &service.ports {
            let args = rule_args(port);

            match rules.iter().find(|rule| rule.listen_port == port.port) {
                None => {
                    info!(
                        lb_id = %balancer.id,
                        service_uid = %service.uid,
                        service_port = port.port,
                        "创建负载均衡规则"
                    );
                    self.rules.create(balancer, args).await?;
                    self.metrics.rules_created.inc();
                }
                Some(rule) => {
                    info!(
                        lb_id = %balancer.id,
                        rule_id = %rule.id,
                        service_uid = %service.uid,
                        service_port = port.port,
                        "更新负载均衡规则"
                    );
                    self.rules.update(rule, args).await?;
                    self.metrics.rules_updated.inc();
                }
            }
        }

        Ok(())
    }

    /// 删除没有对应 Service 端口的规则
    pub(crate) async fn tidy_rules(&self, service: &DesiredService, balancer: &LoadBalancer) -> Result<()> {
        let rules = self.list_rules(balancer).await?;

        for rule in rules.iter().filter(|rule| !service.exposes(rule.listen_port)) {
            info!(
                lb_id = %balancer.id,
                rule_id = %rule.id,
                listen_port = rule.listen_port,
                "删除不再使用的负载均衡规则"
            );
            self.rules.delete(rule).await?;
            self.metrics.rules_deleted.inc();
        }

        debug!("负载均衡器 {} 的规则清理完成", balancer.id);
        Ok(())
    }
}
