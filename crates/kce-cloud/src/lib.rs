//! KCE 云提供商
//!
//! 为 Kubernetes 中 `type: LoadBalancer` 的 Service 在 Katapult 上维护负载均衡器
//! 及其转发规则。协调逻辑是无状态的，每次调用都从远程列表重新计算。

pub mod api;
pub mod config;
pub mod katapult;
pub mod load_balancer;
pub mod metrics;
pub mod naming;
pub mod pagination;
pub mod provider;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use load_balancer::LoadBalancerManager;
pub use provider::{Capability, CapabilityHandle, Provider, PROVIDER_NAME};

use kce_common::Result;
use prometheus::Registry;
use std::path::Path;
use tracing::info;

/// 加载配置并创建提供商
pub fn init(cloud_config: Option<&Path>, registry: &Registry) -> Result<Provider> {
    info!("初始化 KCE 云提供商");

    let config = Config::load(cloud_config)?;
    let provider = Provider::from_config(config, registry)?;

    info!("KCE 云提供商初始化完成");
    Ok(provider)
}
