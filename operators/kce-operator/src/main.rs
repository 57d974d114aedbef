use anyhow::Result;
use clap::Parser;
use kce_operator::{KceOperator, Settings};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// KCE 云控制器
#[derive(Debug, Parser)]
#[command(name = "kce-ccm", version, about)]
struct Args {
    /// 集群名称，参与负载均衡器命名
    #[arg(long, env = "KCE_CLUSTER_NAME")]
    cluster_name: String,

    /// 云配置文件（YAML 或 JSON），环境变量优先
    #[arg(long)]
    cloud_config: Option<PathBuf>,

    /// 指标与健康检查服务地址
    #[arg(long, default_value = "0.0.0.0:9090")]
    metrics_addr: SocketAddr,

    /// 日志级别，设置 RUST_LOG 时以其为准
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let operator = KceOperator::new(Settings {
        cluster_name: args.cluster_name,
        cloud_config: args.cloud_config,
        metrics_addr: args.metrics_addr,
    })
    .await?;

    operator.run().await
}
