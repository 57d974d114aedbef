//! Service 协调模块
//!
//! 对 LoadBalancer 类型的 Service 添加 finalizer：
//! 存在时确保负载均衡器并回写 `status.loadBalancer`，删除时先删除负载均衡器
//! 再移除 finalizer。类型改为非 LoadBalancer 的 Service 同样会清理负载均衡器。

use k8s_openapi::api::core::v1::Service;
use kce_cloud::Provider;
use kube::{
    api::{Api, Patch, PatchParams},
    client::Client,
    runtime::{
        controller::Action,
        finalizer::{self, finalizer, Event},
    },
    ResourceExt,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::convert::{current_status, desired_service, is_load_balancer, load_balancer_status};

/// 负载均衡器 finalizer
pub const LOAD_BALANCER_FINALIZER: &str = "kce.katapult.io/load-balancer";

/// 成功协调后的重新检查间隔
pub const RESYNC_INTERVAL: Duration = Duration::from_secs(300);

/// 协调失败后的重试间隔
pub const ERROR_REQUEUE_INTERVAL: Duration = Duration::from_secs(30);

/// 协调错误
#[derive(Debug, Error)]
pub enum Error {
    #[error("云提供商错误: {0}")]
    Cloud(#[from] kce_common::Error),

    #[error("Kubernetes API 错误: {0}")]
    Kube(#[from] kube::Error),

    #[error("finalizer 错误: {0}")]
    Finalizer(#[source] Box<finalizer::Error<Error>>),
}

/// 协调上下文
pub struct Context {
    /// Kubernetes 客户端
    pub client: Client,
    /// 云提供商
    pub provider: Arc<Provider>,
    /// 集群名称，参与负载均衡器命名
    pub cluster_name: String,
}

/// 协调单个 Service
pub async fn reconcile(svc: Arc<Service>, ctx: Arc<Context>) -> Result<Action, Error> {
    let namespace = svc.namespace().unwrap_or_else(|| "default".into());
    let services: Api<Service> = Api::namespaced(ctx.client.clone(), &namespace);

    if !is_load_balancer(&svc) {
        if has_finalizer(&svc) {
            info!("Service {}/{} 已不是 LoadBalancer 类型，清理负载均衡器", namespace, svc.name_any());
            cleanup(&svc, &ctx).await?;
            remove_finalizer(&services, &svc).await?;
        }
        return Ok(Action::await_change());
    }

    finalizer(&services, LOAD_BALANCER_FINALIZER, svc, |event| async {
        match event {
            Event::Apply(svc) => apply(&services, &svc, &ctx).await,
            Event::Cleanup(svc) => cleanup(&svc, &ctx).await,
        }
    })
    .await
    .map_err(|e| Error::Finalizer(Box::new(e)))
}

/// 协调失败时的重试策略
pub fn error_policy(svc: Arc<Service>, error: &Error, _ctx: Arc<Context>) -> Action {
    let namespace = svc.namespace().unwrap_or_else(|| "default".into());
    warn!("协调 Service {}/{} 失败: {}", namespace, svc.name_any(), error);
    Action::requeue(ERROR_REQUEUE_INTERVAL)
}

async fn apply(services: &Api<Service>, svc: &Service, ctx: &Context) -> Result<Action, Error> {
    let desired = desired_service(svc)?;
    info!("协调 Service {}/{}", desired.namespace, desired.name);

    let ingress = ctx
        .provider
        .load_balancer()
        .ensure_load_balancer(&ctx.cluster_name, &desired, &[])
        .await?;

    let status = load_balancer_status(&ingress);
    if current_status(svc).as_ref() == Some(&status) {
        debug!("Service {}/{} 状态未变化", desired.namespace, desired.name);
    } else {
        let patch = json!({ "status": { "loadBalancer": status } });
        services
            .patch_status(&desired.name, &PatchParams::default(), &Patch::Merge(patch))
            .await?;
        info!("已更新 Service {}/{} 的负载均衡器状态", desired.namespace, desired.name);
    }

    Ok(Action::requeue(RESYNC_INTERVAL))
}

async fn cleanup(svc: &Service, ctx: &Context) -> Result<Action, Error> {
    let desired = desired_cleanup_target(svc);
    info!("删除 Service {}/{} 的负载均衡器", desired.namespace, desired.name);

    ctx.provider
        .load_balancer()
        .ensure_load_balancer_deleted(&ctx.cluster_name, &desired)
        .await?;

    Ok(Action::await_change())
}

/// 删除只需要名称，端口缺少 NodePort 不应阻止清理
fn desired_cleanup_target(svc: &Service) -> kce_common::DesiredService {
    kce_common::DesiredService {
        namespace: svc.namespace().unwrap_or_else(|| "default".into()),
        name: svc.name_any(),
        uid: svc.uid().unwrap_or_default(),
        ports: Vec::new(),
    }
}

fn has_finalizer(svc: &Service) -> bool {
    svc.finalizers().iter().any(|f| f == LOAD_BALANCER_FINALIZER)
}

async fn remove_finalizer(services: &Api<Service>, svc: &Service) -> Result<(), Error> {
    let remaining: Vec<&String> = svc
        .finalizers()
        .iter()
        .filter(|f| f.as_str() != LOAD_BALANCER_FINALIZER)
        .collect();
    let patch = json!({ "metadata": { "finalizers": remaining } });

    services
        .patch(&svc.name_any(), &PatchParams::default(), &Patch::Merge(patch))
        .await?;
    Ok(())
}
