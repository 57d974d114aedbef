//! Kubernetes 对象与协调模型之间的转换

use k8s_openapi::api::core::v1::{LoadBalancerIngress, LoadBalancerStatus, Service};
use kce_common::{DesiredService, Error, IngressStatus, Result, ServicePort, DEFAULT_NAMESPACE};
use kube::ResourceExt;

/// LoadBalancer 类型的 Service
pub const LOAD_BALANCER_TYPE: &str = "LoadBalancer";

/// Service 是否为 LoadBalancer 类型
pub fn is_load_balancer(svc: &Service) -> bool {
    svc.spec
        .as_ref()
        .and_then(|spec| spec.type_.as_deref())
        == Some(LOAD_BALANCER_TYPE)
}

/// 提取协调所需的 Service 信息
///
/// 每个端口都必须已经分配 NodePort，否则返回 [`Error::InvalidService`]。
pub fn desired_service(svc: &Service) -> Result<DesiredService> {
    let name = svc.name_any();
    let namespace = svc
        .namespace()
        .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());
    let uid = svc
        .uid()
        .ok_or_else(|| Error::InvalidService(format!("{namespace}/{name} 缺少 UID")))?;

    let ports = svc
        .spec
        .as_ref()
        .and_then(|spec| spec.ports.as_ref())
        .map(|ports| {
            ports
                .iter()
                .map(|p| -> Result<ServicePort> {
                    let port = u16::try_from(p.port).map_err(|_| {
                        Error::InvalidService(format!("{namespace}/{name} 端口 {} 超出范围", p.port))
                    })?;
                    let node_port = p
                        .node_port
                        .filter(|np| *np > 0)
                        .and_then(|np| u16::try_from(np).ok())
                        .ok_or_else(|| {
                            Error::InvalidService(format!(
                                "{namespace}/{name} 端口 {port} 尚未分配 NodePort"
                            ))
                        })?;

                    Ok(ServicePort {
                        name: p.name.clone(),
                        port,
                        node_port,
                    })
                })
                .collect::<Result<Vec<_>>>()
        })
        .transpose()?
        .unwrap_or_default();

    Ok(DesiredService {
        namespace,
        name,
        uid,
        ports,
    })
}

/// 转换为 Service 的 `status.loadBalancer`
pub fn load_balancer_status(status: &IngressStatus) -> LoadBalancerStatus {
    let ingress: Vec<LoadBalancerIngress> = status
        .ingress
        .iter()
        .map(|point| LoadBalancerIngress {
            ip: Some(point.ip.clone()),
            ..Default::default()
        })
        .collect();

    LoadBalancerStatus {
        ingress: Some(ingress),
    }
}

/// Service 当前记录的负载均衡器状态
pub fn current_status(svc: &Service) -> Option<LoadBalancerStatus> {
    svc.status.as_ref().and_then(|s| s.load_balancer.clone())
}
