//! 控制器模块
//!
//! 监听集群内所有 Service，把变化交给 [`reconcile`](crate::reconcile::reconcile)。
//! 同一个 Service 的协调由 kube 运行时串行调度。

use futures::StreamExt;
use k8s_openapi::api::core::v1::Service;
use kube::{
    api::Api,
    runtime::{watcher, Controller},
};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::reconcile::{error_policy, reconcile, Context};

/// 运行 Service 控制器，收到终止信号后返回
pub async fn run(ctx: Arc<Context>) {
    let services: Api<Service> = Api::all(ctx.client.clone());

    info!("启动 Service 控制器，集群: {}", ctx.cluster_name);

    Controller::new(services, watcher::Config::default())
        .shutdown_on_signal()
        .run(reconcile, error_policy, ctx)
        .for_each(|result| async move {
            match result {
                Ok((obj, action)) => debug!("协调完成: {} -> {:?}", obj.name, action),
                Err(e) => warn!("协调错误: {}", e),
            }
        })
        .await;

    info!("Service 控制器已停止");
}
