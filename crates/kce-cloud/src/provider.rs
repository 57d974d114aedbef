//! 云提供商入口
//!
//! 集群侧通过 [`Provider`] 查询能力并取得负载均衡器管理器。
//! 除负载均衡器外的能力（实例、可用区、路由等）都不支持。

use kce_common::{Error, Result};
use prometheus::Registry;
use std::fmt;
use std::sync::Arc;
use tracing::info;

use crate::api::{LoadBalancerApi, LoadBalancerRuleApi};
use crate::config::Config;
use crate::katapult::KatapultClient;
use crate::load_balancer::LoadBalancerManager;
use crate::metrics::ReconcileMetrics;

/// 提供商名称
pub const PROVIDER_NAME: &str = "kce";

/// 云提供商能力
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    LoadBalancer,
    Instances,
    InstancesV2,
    Zones,
    Clusters,
    Routes,
}

impl Capability {
    /// 全部能力
    pub const ALL: [Capability; 6] = [
        Capability::LoadBalancer,
        Capability::Instances,
        Capability::InstancesV2,
        Capability::Zones,
        Capability::Clusters,
        Capability::Routes,
    ];
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::LoadBalancer => "LoadBalancer",
            Capability::Instances => "Instances",
            Capability::InstancesV2 => "InstancesV2",
            Capability::Zones => "Zones",
            Capability::Clusters => "Clusters",
            Capability::Routes => "Routes",
        };
        f.write_str(name)
    }
}

/// 能力查询结果
pub enum CapabilityHandle<'a> {
    /// 支持，附带负载均衡器管理器
    LoadBalancer(&'a LoadBalancerManager),
    /// 不支持
    Unsupported(Capability),
}

impl CapabilityHandle<'_> {
    pub fn is_supported(&self) -> bool {
        matches!(self, CapabilityHandle::LoadBalancer(_))
    }
}

/// KCE 云提供商
pub struct Provider {
    load_balancers: LoadBalancerManager,
}

impl Provider {
    /// 使用给定的远程集合创建提供商
    pub fn new(
        config: Config,
        load_balancers: Arc<dyn LoadBalancerApi>,
        rules: Arc<dyn LoadBalancerRuleApi>,
    ) -> Self {
        Self {
            load_balancers: LoadBalancerManager::new(config, load_balancers, rules),
        }
    }

    /// 根据配置创建连接 Katapult 的提供商，并把协调指标注册到 `registry`
    pub fn from_config(config: Config, registry: &Registry) -> Result<Self> {
        let client = KatapultClient::new(&config)?;
        let metrics = ReconcileMetrics::register(registry)
            .map_err(|e| Error::Config(format!("注册监控指标失败: {e}")))?;

        info!(
            "初始化 {} 云提供商: 组织 {}, 数据中心 {}",
            PROVIDER_NAME, config.organization_id, config.data_center_id
        );

        let load_balancers = LoadBalancerManager::new(
            config,
            Arc::new(client.load_balancers()),
            Arc::new(client.load_balancer_rules()),
        )
        .with_metrics(metrics);

        Ok(Self { load_balancers })
    }

    /// 提供商名称
    pub fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }

    /// 负载均衡器名称依赖集群名称
    pub fn has_cluster_id(&self) -> bool {
        true
    }

    /// 查询能力
    pub fn capability(&self, capability: Capability) -> CapabilityHandle<'_> {
        match capability {
            Capability::LoadBalancer => CapabilityHandle::LoadBalancer(&self.load_balancers),
            other => CapabilityHandle::Unsupported(other),
        }
    }

    /// 负载均衡器管理器
    pub fn load_balancer(&self) -> &LoadBalancerManager {
        &self.load_balancers
    }
}
