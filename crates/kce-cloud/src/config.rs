//! 配置管理模块
//!
//! 从可选的配置文件（YAML/JSON）和 `KATAPULT_` 前缀的环境变量加载配置，
//! 环境变量优先。配置在构造后不可变，由协调逻辑只读共享。

use ::config::{Environment, File, FileFormat};
use kce_common::{DataCenterRef, Error, OrganizationRef, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::info;
use url::Url;

/// 环境变量前缀
pub const ENV_PREFIX: &str = "KATAPULT";

/// Katapult API 默认地址
pub const DEFAULT_API_HOST: &str = "https://api.katapult.io/";

/// 单个 HTTP 请求的默认超时（秒）
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// 单次协调操作的默认截止时间（秒）
pub const DEFAULT_OPERATION_TIMEOUT_SECS: u64 = 120;

/// 配置源中的原始字段
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    api_token: Option<String>,
    api_host: Option<String>,
    organization_rid: Option<String>,
    data_center_rid: Option<String>,
    node_tag_rid: Option<String>,
    request_timeout_secs: Option<u64>,
    operation_timeout_secs: Option<u64>,
}

/// 经过校验的配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// API 令牌
    pub api_token: String,
    /// API 地址
    pub api_host: Url,
    /// 组织 ID
    pub organization_id: String,
    /// 数据中心 ID
    pub data_center_id: String,
    /// 负载均衡器指向的节点标签 ID
    pub node_tag_id: String,
    /// 单个 HTTP 请求超时
    pub request_timeout: Duration,
    /// 单次协调操作的截止时间
    pub operation_timeout: Duration,
}

impl Config {
    /// 仅从环境变量加载
    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }

    /// 从配置文件（可选）和环境变量加载
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, None)
    }

    /// 组织引用
    pub fn org_ref(&self) -> OrganizationRef {
        OrganizationRef {
            id: self.organization_id.clone(),
        }
    }

    /// 数据中心引用
    pub fn dc_ref(&self) -> DataCenterRef {
        DataCenterRef {
            id: self.data_center_id.clone(),
        }
    }

    /// `env` 为 `Some` 时代替进程环境变量
    fn load_with(path: Option<&Path>, env: Option<HashMap<String, String>>) -> Result<Self> {
        let mut builder = ::config::Config::builder();

        if let Some(path) = path {
            let format = match path.extension().and_then(|ext| ext.to_str()) {
                Some("yaml") | Some("yml") => FileFormat::Yaml,
                Some("json") => FileFormat::Json,
                _ => {
                    return Err(Error::Config(
                        "不支持的配置文件格式，仅支持 YAML 或 JSON".to_string(),
                    ))
                }
            };
            builder = builder.add_source(File::from(path).format(format));
        }

        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).source(env));

        let raw = builder
            .build()
            .and_then(|c| c.try_deserialize::<RawConfig>())
            .map_err(|e| Error::Config(e.to_string()))?;

        Self::validate(raw)
    }

    fn validate(raw: RawConfig) -> Result<Self> {
        let api_token = required(raw.api_token, "未配置 API 令牌")?;
        let organization_id = required(raw.organization_rid, "未设置组织 ID")?;
        let data_center_id = required(raw.data_center_rid, "未设置数据中心 ID")?;
        let node_tag_id = required(raw.node_tag_rid, "未设置节点标签 ID")?;

        let api_host = match raw.api_host.filter(|h| !h.is_empty()) {
            Some(host) => {
                let url = Url::parse(&host)
                    .map_err(|e| Error::Config(format!("无法解析 API 地址: {e}")))?;
                info!("已覆盖默认 API 地址: {}", url);
                url
            }
            None => Url::parse(DEFAULT_API_HOST)
                .map_err(|e| Error::Config(format!("无法解析 API 地址: {e}")))?,
        };

        Ok(Self {
            api_token,
            api_host,
            organization_id,
            data_center_id,
            node_tag_id,
            request_timeout: Duration::from_secs(
                raw.request_timeout_secs.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            ),
            operation_timeout: Duration::from_secs(
                raw.operation_timeout_secs.unwrap_or(DEFAULT_OPERATION_TIMEOUT_SECS),
            ),
        })
    }
}

fn required(value: Option<String>, missing: &str) -> Result<String> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::Config(missing.to_string()))
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        api_token: "atoken".to_string(),
        api_host: Url::parse(DEFAULT_API_HOST).unwrap(),
        organization_id: "org_fake".to_string(),
        data_center_id: "dc_atlantis".to_string(),
        node_tag_id: "tag_k8s_nodes".to_string(),
        request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        operation_timeout: Duration::from_secs(DEFAULT_OPERATION_TIMEOUT_SECS),
    }
}
