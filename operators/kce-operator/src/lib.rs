//! KCE Operator
//!
//! 作为集群内的云控制器运行：监听 LoadBalancer 类型的 Service，
//! 通过 [`kce_cloud::Provider`] 在 Katapult 上维护对应的负载均衡器。

pub mod controller;
pub mod convert;
pub mod health;
pub mod reconcile;

use anyhow::{Context as _, Result};
use kube::Client;
use prometheus::Registry;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

/// Operator 启动参数
#[derive(Debug, Clone)]
pub struct Settings {
    /// 集群名称
    pub cluster_name: String,
    /// 云配置文件
    pub cloud_config: Option<PathBuf>,
    /// 指标服务地址
    pub metrics_addr: SocketAddr,
}

/// Operator 主结构体
pub struct KceOperator {
    /// 协调上下文
    context: Arc<reconcile::Context>,
    /// Prometheus 注册表
    registry: Registry,
    /// 指标服务地址
    metrics_addr: SocketAddr,
}

impl KceOperator {
    /// 创建新的 Operator 实例
    pub async fn new(settings: Settings) -> Result<Self> {
        let registry = Registry::new();
        let provider = kce_cloud::init(settings.cloud_config.as_deref(), &registry)
            .context("初始化云提供商失败")?;

        let client = Client::try_default()
            .await
            .context("创建 Kubernetes 客户端失败")?;

        Ok(Self {
            context: Arc::new(reconcile::Context {
                client,
                provider: Arc::new(provider),
                cluster_name: settings.cluster_name,
            }),
            registry,
            metrics_addr: settings.metrics_addr,
        })
    }

    /// 启动 Operator，控制器停止后返回
    pub async fn run(self) -> Result<()> {
        let addr = self.metrics_addr;
        let registry = self.registry.clone();
        tokio::spawn(async move {
            if let Err(e) = health::serve(addr, registry).await {
                error!("指标服务器错误: {}", e);
            }
        });

        info!(
            "{} 云控制器已启动",
            self.context.provider.provider_name()
        );
        controller::run(self.context).await;
        Ok(())
    }
}
