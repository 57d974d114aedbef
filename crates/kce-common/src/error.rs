//! 错误处理模块
//!
//! 该模块提供 KCE 项目的统一错误类型。远程调用失败、配置错误和
//! 输入校验失败都汇总到 [`Error`]，调用方负责重试策略。
//!
//! 注意：“负载均衡器不存在”不是错误，查找操作以 `Option::None` 表示。

use std::time::Duration;
use thiserror::Error;

/// KCE 统一错误类型
#[derive(Error, Debug)]
pub enum Error {
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),

    /// 远程 API 返回了非成功响应
    #[error("API 错误 ({status}) {code}: {message}")]
    Api {
        /// HTTP 状态码
        status: u16,
        /// Katapult 错误代码
        code: String,
        /// 错误描述
        message: String,
    },

    /// 网络或 HTTP 客户端错误
    #[error("传输错误: {0}")]
    Transport(String),

    /// Service 无法转换为期望状态
    #[error("无效的 Service: {0}")]
    InvalidService(String),

    /// 操作超过截止时间
    #[error("操作超时: 超过 {0:?}")]
    DeadlineExceeded(Duration),

    /// JSON 错误
    #[error("JSON 错误: {0}")]
    Json(#[from] serde_json::Error),
}

/// KCE 结果类型别名
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// 是否为远程调用产生的错误（API 响应或传输失败）
    pub fn is_remote(&self) -> bool {
        matches!(self, Error::Api { .. } | Error::Transport(_))
    }
}
