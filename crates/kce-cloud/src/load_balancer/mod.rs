//! 负载均衡器协调模块
//!
//! [`LoadBalancerManager`] 对外提供五个操作：查询状态、推导名称、确保存在、
//! 更新节点（空操作）和确保删除。每次调用都从远程列表重新计算状态，
//! 模块内部不保存任何跨调用的状态。
//!
//! 同一服务的两个并发 `ensure_load_balancer` 调用可能都看到“不存在”并各自
//! 创建负载均衡器；这里没有加锁，依赖调用方按服务串行调度。

mod rules;

pub use rules::{rule_args, CHECK_FALL, CHECK_INTERVAL, CHECK_RISE, CHECK_TIMEOUT};

use kce_common::{
    DesiredService, Error, IngressStatus, LoadBalancer, LoadBalancerCreateArgs, ResourceType,
    Result,
};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info};

use crate::api::{LoadBalancerApi, LoadBalancerRuleApi};
use crate::config::Config;
use crate::metrics::ReconcileMetrics;
use crate::naming;
use crate::pagination::list_all;

/// 负载均衡器管理器
pub struct LoadBalancerManager {
    /// 静态配置
    config: Config,
    /// 负载均衡器集合
    load_balancers: Arc<dyn LoadBalancerApi>,
    /// 负载均衡规则集合
    rules: Arc<dyn LoadBalancerRuleApi>,
    /// 协调指标
    metrics: ReconcileMetrics,
}

impl LoadBalancerManager {
    /// 创建新的管理器
    pub fn new(
        config: Config,
        load_balancers: Arc<dyn LoadBalancerApi>,
        rules: Arc<dyn LoadBalancerRuleApi>,
    ) -> Self {
        Self {
            config,
            load_balancers,
            rules,
            metrics: ReconcileMetrics::default(),
        }
    }

    /// 使用已注册的指标
    pub fn with_metrics(mut self, metrics: ReconcileMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// 获取配置
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 负载均衡器名称
    pub fn load_balancer_name(&self, cluster_name: &str, service: &DesiredService) -> String {
        naming::load_balancer_name(cluster_name, &service.namespace, &service.name)
    }

    /// 查询负载均衡器状态
    ///
    /// 负载均衡器不存在时返回 `Ok(None)`。
    pub async fn get_load_balancer(
        &self,
        cluster_name: &str,
        service: &DesiredService,
    ) -> Result<Option<IngressStatus>> {
        let name = self.load_balancer_name(cluster_name, service);

        self.with_deadline(async {
            let found = self.find_load_balancer(&name).await?;
            Ok(found.as_ref().map(IngressStatus::from))
        })
        .await
    }

    /// 创建或更新负载均衡器，返回入口状态
    ///
    /// 新建的负载均衡器通过节点标签选择目标，`nodes` 不参与协调。
    /// 先创建/更新规则再清理旧规则，替换端口映射时不会出现流量空窗。
    pub async fn ensure_load_balancer(
        &self,
        cluster_name: &str,
        service: &DesiredService,
        _nodes: &[String],
    ) -> Result<IngressStatus> {
        let name = self.load_balancer_name(cluster_name, service);

        self.with_deadline(async {
            let balancer = match self.find_load_balancer(&name).await? {
                Some(balancer) => balancer,
                None => self.create_load_balancer(&name).await?,
            };

            self.ensure_rules(service, &balancer).await?;
            self.tidy_rules(service, &balancer).await?;

            Ok(IngressStatus::from(&balancer))
        })
        .await
    }

    /// 更新负载均衡器的后端节点
    ///
    /// 节点成员关系由远端的标签机制维护，这里什么也不做。
    pub async fn update_load_balancer(
        &self,
        cluster_name: &str,
        service: &DesiredService,
        nodes: &[String],
    ) -> Result<()> {
        debug!(
            "忽略负载均衡器 {} 的节点更新 ({} 个节点)",
            self.load_balancer_name(cluster_name, service),
            nodes.len()
        );
        Ok(())
    }

    /// 确保负载均衡器已删除
    ///
    /// 负载均衡器不存在时视为成功。
    pub async fn ensure_load_balancer_deleted(
        &self,
        cluster_name: &str,
        service: &DesiredService,
    ) -> Result<()> {
        let name = self.load_balancer_name(cluster_name, service);

        self.with_deadline(async {
            let Some(balancer) = self.find_load_balancer(&name).await? else {
                debug!("负载均衡器 {} 不存在，无需删除", name);
                return Ok(());
            };

            info!(lb_id = %balancer.id, lb_name = %name, "删除负载均衡器");
            self.load_balancers.delete(&balancer).await?;
            self.metrics.load_balancers_deleted.inc();
            Ok(())
        })
        .await
    }

    /// 列出组织下的全部负载均衡器
    pub(crate) async fn list_load_balancers(&self) -> Result<Vec<LoadBalancer>> {
        let org = self.config.org_ref();
        list_all(|opts| self.load_balancers.list(&org, opts)).await
    }

    /// 按名称查找负载均衡器，返回第一个匹配项
    pub(crate) async fn find_load_balancer(&self, name: &str) -> Result<Option<LoadBalancer>> {
        let found = self
            .list_load_balancers()
            .await?
            .into_iter()
            .find(|lb| lb.name == name);

        if found.is_none() {
            debug!("未找到负载均衡器 {}", name);
        }
        Ok(found)
    }

    async fn create_load_balancer(&self, name: &str) -> Result<LoadBalancer> {
        info!(lb_name = %name, data_center = %self.config.data_center_id, "创建负载均衡器");

        let balancer = self
            .load_balancers
            .create(
                &self.config.org_ref(),
                LoadBalancerCreateArgs {
                    name: name.to_string(),
                    data_center: self.config.dc_ref(),
                    resource_type: ResourceType::Tags,
                    resource_ids: vec![self.config.node_tag_id.clone()],
                },
            )
            .await?;

        self.metrics.load_balancers_created.inc();
        Ok(balancer)
    }

    /// 为操作加上截止时间，超时后未完成的远程调用随 future 一起被丢弃
    async fn with_deadline<T>(&self, operation: impl Future<Output = Result<T>>) -> Result<T> {
        let limit = self.config.operation_timeout;
        tokio::time::timeout(limit, operation)
            .await
            .map_err(|_| Error::DeadlineExceeded(limit))?
    }
}
