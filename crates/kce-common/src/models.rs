//! 数据模型模块
//!
//! 该模块定义了 Katapult 负载均衡器资源模型以及 Service 的期望状态模型。

pub mod load_balancer;
pub mod service;
