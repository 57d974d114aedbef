//! KCE Common - 跨模块共享的数据结构与错误类型
//!
//! 该模块提供 KCE 项目中所有组件共享的数据模型和错误处理机制，
//! 包括 Katapult 负载均衡器资源、Service 期望状态以及入口状态。

pub mod models;
pub mod error;

/// 重新导出常用类型，方便使用
pub use error::Error;
pub use error::Result;
pub use models::load_balancer::*;
pub use models::service::*;
