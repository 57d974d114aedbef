//! Service 期望状态模型
//!
//! 描述一个需要负载均衡器的服务：身份信息和有序的端口声明。
//! 协调逻辑只读取这些数据，从不修改。

use serde::{Deserialize, Serialize};

use crate::models::load_balancer::LoadBalancer;

/// Kubernetes 默认命名空间
pub const DEFAULT_NAMESPACE: &str = "default";

/// 端口声明
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicePort {
    /// 端口名称（可选）
    pub name: Option<String>,
    /// 对外暴露的端口
    pub port: u16,
    /// 节点端口
    pub node_port: u16,
}

/// 期望的服务状态
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DesiredService {
    /// 命名空间
    pub namespace: String,
    /// 服务名称
    pub name: String,
    /// 稳定的唯一 ID
    pub uid: String,
    /// 端口声明，按声明顺序
    pub ports: Vec<ServicePort>,
}

impl DesiredService {
    /// 是否声明了指定的对外端口
    pub fn exposes(&self, listen_port: u16) -> bool {
        self.ports.iter().any(|p| p.port == listen_port)
    }
}

/// 单个入口点
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngressPoint {
    pub ip: String,
}

/// 负载均衡器的入口状态
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IngressStatus {
    pub ingress: Vec<IngressPoint>,
}

impl From<&LoadBalancer> for IngressStatus {
    fn from(lb: &LoadBalancer) -> Self {
        // 新建的负载均衡器可能还没有分配地址
        let ingress = lb
            .ip_address
            .iter()
            .map(|ip| IngressPoint {
                ip: ip.address.clone(),
            })
            .collect();

        Self { ingress }
    }
}
