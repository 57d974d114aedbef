//! Katapult 负载均衡器资源模型
//!
//! 该模块定义了 Katapult core API 中负载均衡器、负载均衡规则及分页元数据的
//! 数据结构，字段命名与 API 的 JSON 表示保持一致。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 组织引用
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrganizationRef {
    /// 组织 ID
    pub id: String,
}

/// 数据中心引用
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DataCenterRef {
    /// 数据中心 ID
    pub id: String,
}

/// IP 地址
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IpAddress {
    #[serde(default)]
    pub id: String,
    /// 点分或冒号分隔的地址文本
    pub address: String,
}

/// 负载均衡器目标资源类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    /// 按标签选择虚拟机
    #[default]
    Tags,
    /// 指定虚拟机
    VirtualMachines,
    /// 指定虚拟机组
    VirtualMachineGroups,
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceType::Tags => write!(f, "tags"),
            ResourceType::VirtualMachines => write!(f, "virtual_machines"),
            ResourceType::VirtualMachineGroups => write!(f, "virtual_machine_groups"),
        }
    }
}

/// 负载均衡器
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LoadBalancer {
    /// 资源 ID
    pub id: String,
    /// 外部可见名称
    #[serde(default)]
    pub name: String,
    /// 目标资源类型
    #[serde(default)]
    pub resource_type: ResourceType,
    /// 目标资源 ID 列表
    #[serde(default)]
    pub resource_ids: Vec<String>,
    /// 入口 IP 地址
    #[serde(default)]
    pub ip_address: Option<IpAddress>,
    /// 所在数据中心
    #[serde(default)]
    pub data_center: Option<DataCenterRef>,
}

/// 创建负载均衡器的参数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadBalancerCreateArgs {
    pub name: String,
    pub data_center: DataCenterRef,
    pub resource_type: ResourceType,
    pub resource_ids: Vec<String>,
}

/// 更新负载均衡器的参数，未设置的字段不发送
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LoadBalancerUpdateArgs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<ResourceType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_ids: Option<Vec<String>>,
}

/// 负载均衡算法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleAlgorithm {
    /// 轮询
    #[default]
    RoundRobin,
    /// 最少连接
    LeastConnections,
    /// 会话保持的轮询
    StickyRoundRobin,
}

impl fmt::Display for RuleAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleAlgorithm::RoundRobin => write!(f, "round_robin"),
            RuleAlgorithm::LeastConnections => write!(f, "least_connections"),
            RuleAlgorithm::StickyRoundRobin => write!(f, "sticky_round_robin"),
        }
    }
}

/// 规则协议
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
    /// TCP 协议
    #[default]
    Tcp,
    /// HTTP 协议
    Http,
    /// HTTPS 协议
    Https,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Tcp => write!(f, "TCP"),
            Protocol::Http => write!(f, "HTTP"),
            Protocol::Https => write!(f, "HTTPS"),
        }
    }
}

/// 负载均衡规则
///
/// 规则与 Service 端口的对应关系只由 `listen_port` 决定，规则 ID 不会被记录。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LoadBalancerRule {
    /// 资源 ID
    pub id: String,
    #[serde(default)]
    pub algorithm: RuleAlgorithm,
    /// 对外监听端口
    #[serde(default)]
    pub listen_port: u16,
    /// 节点侧目标端口
    #[serde(default)]
    pub destination_port: u16,
    #[serde(default)]
    pub protocol: Protocol,
    #[serde(default)]
    pub proxy_protocol: bool,
    #[serde(default)]
    pub check_enabled: bool,
    #[serde(default)]
    pub check_protocol: Option<Protocol>,
    #[serde(default)]
    pub check_path: Option<String>,
    #[serde(default)]
    pub check_timeout: Option<u32>,
    #[serde(default)]
    pub check_interval: Option<u32>,
    #[serde(default)]
    pub check_rise: Option<u32>,
    #[serde(default)]
    pub check_fall: Option<u32>,
}

/// 创建或更新规则的参数
///
/// 更新时总是发送完整参数，不做增量补丁。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadBalancerRuleArgs {
    pub algorithm: RuleAlgorithm,
    pub destination_port: u16,
    pub listen_port: u16,
    pub protocol: Protocol,
    pub proxy_protocol: bool,
    pub check_enabled: bool,
    pub check_protocol: Protocol,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_path: Option<String>,
    pub check_timeout: u32,
    pub check_interval: u32,
    pub check_rise: u32,
    pub check_fall: u32,
}

/// 列表请求的分页选项，未设置时使用服务端默认值
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListOptions {
    /// 页码，从 1 开始
    pub page: Option<u32>,
    /// 每页条目数
    pub per_page: Option<u32>,
}

impl ListOptions {
    /// 指定页码的选项
    pub fn page(page: u32) -> Self {
        Self {
            page: Some(page),
            per_page: None,
        }
    }
}

/// 分页元数据
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub current_page: u32,
    #[serde(default)]
    pub per_page: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total: u64,
}

/// 一页列表结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}
