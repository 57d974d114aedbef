//! 远程集合接口
//!
//! 协调逻辑只通过这两个 trait 访问 Katapult，便于替换为测试替身。
//! 实现必须是 `Send + Sync`，一个实例会被多个服务的协调任务共享。

use async_trait::async_trait;
use kce_common::{
    ListOptions, LoadBalancer, LoadBalancerCreateArgs, LoadBalancerRule, LoadBalancerRuleArgs,
    LoadBalancerUpdateArgs, OrganizationRef, Page, Result,
};

/// 负载均衡器集合
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoadBalancerApi: Send + Sync {
    /// 列出组织下的一页负载均衡器
    async fn list(&self, org: &OrganizationRef, opts: ListOptions) -> Result<Page<LoadBalancer>>;

    /// 在组织下创建负载均衡器
    async fn create(&self, org: &OrganizationRef, args: LoadBalancerCreateArgs) -> Result<LoadBalancer>;

    /// 更新负载均衡器
    async fn update(&self, lb: &LoadBalancer, args: LoadBalancerUpdateArgs) -> Result<LoadBalancer>;

    /// 删除负载均衡器
    async fn delete(&self, lb: &LoadBalancer) -> Result<LoadBalancer>;
}

/// 负载均衡规则集合，作用域为单个负载均衡器
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoadBalancerRuleApi: Send + Sync {
    /// 列出负载均衡器的一页规则
    async fn list(&self, lb: &LoadBalancer, opts: ListOptions) -> Result<Page<LoadBalancerRule>>;

    /// 创建规则
    async fn create(&self, lb: &LoadBalancer, args: LoadBalancerRuleArgs) -> Result<LoadBalancerRule>;

    /// 以完整参数覆盖规则
    async fn update(&self, rule: &LoadBalancerRule, args: LoadBalancerRuleArgs) -> Result<LoadBalancerRule>;

    /// 删除规则
    async fn delete(&self, rule: &LoadBalancerRule) -> Result<LoadBalancerRule>;
}
