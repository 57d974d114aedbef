//! Katapult REST 客户端
//!
//! 实现 [`LoadBalancerApi`] 和 [`LoadBalancerRuleApi`]，使用 `reqwest` 访问
//! Katapult core v1 接口。非 2xx 响应解析为 [`Error::Api`]，连接和读取失败
//! 映射为 [`Error::Transport`]。

use async_trait::async_trait;
use kce_common::{
    Error, ListOptions, LoadBalancer, LoadBalancerCreateArgs, LoadBalancerRule,
    LoadBalancerRuleArgs, LoadBalancerUpdateArgs, OrganizationRef, Page, Pagination, Result,
};
use reqwest::{Client as HttpClient, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;
use url::Url;

use crate::api::{LoadBalancerApi, LoadBalancerRuleApi};
use crate::config::Config;

/// 发往 Katapult 的 User-Agent
pub const USER_AGENT: &str = concat!("kce-ccm/", env!("CARGO_PKG_VERSION"));

const LOAD_BALANCERS_PATH: &str = "core/v1/organizations/_/load_balancers";
const LOAD_BALANCER_PATH: &str = "core/v1/load_balancers/_";
const RULES_PATH: &str = "core/v1/load_balancers/_/rules";
const RULE_PATH: &str = "core/v1/load_balancers/rules/_";

/// 错误响应体
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct LoadBalancersResponse {
    load_balancers: Vec<LoadBalancer>,
    pagination: Pagination,
}

#[derive(Debug, Deserialize)]
struct LoadBalancerResponse {
    load_balancer: LoadBalancer,
}

#[derive(Debug, Deserialize)]
struct RulesResponse {
    load_balancer_rules: Vec<LoadBalancerRule>,
    pagination: Pagination,
}

#[derive(Debug, Deserialize)]
struct RuleResponse {
    load_balancer_rule: LoadBalancerRule,
}

/// Katapult HTTP 客户端
///
/// 克隆开销很小，底层连接池在克隆之间共享。
#[derive(Debug, Clone)]
pub struct KatapultClient {
    http: HttpClient,
    base_url: Url,
    api_token: String,
}

impl KatapultClient {
    /// 根据配置创建客户端
    pub fn new(config: &Config) -> Result<Self> {
        let http = HttpClient::builder()
            .user_agent(USER_AGENT)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| Error::Config(format!("创建 HTTP 客户端失败: {e}")))?;

        let mut base_url = config.api_host.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            http,
            base_url,
            api_token: config.api_token.clone(),
        })
    }

    /// 负载均衡器集合
    pub fn load_balancers(&self) -> LoadBalancersClient {
        LoadBalancersClient {
            client: self.clone(),
        }
    }

    /// 负载均衡规则集合
    pub fn load_balancer_rules(&self) -> LoadBalancerRulesClient {
        LoadBalancerRulesClient {
            client: self.clone(),
        }
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| Error::Config(format!("无法拼接 API 地址 {path}: {e}")))
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        Ok(self
            .http
            .request(method, self.url(path)?)
            .bearer_auth(&self.api_token))
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        let status = response.status();
        debug!("Katapult 响应: {} {}", status, response.url().path());

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(api_error(status.as_u16(), &body));
        }
        Ok(serde_json::from_slice(&body)?)
    }
}

/// 把非 2xx 响应转换为 [`Error::Api`]
fn api_error(status: u16, body: &[u8]) -> Error {
    match serde_json::from_slice::<ErrorResponse>(body) {
        Ok(resp) => Error::Api {
            status,
            code: resp.error.code,
            message: resp.error.description,
        },
        Err(_) => Error::Api {
            status,
            code: "unknown".to_string(),
            message: String::from_utf8_lossy(body).trim().to_string(),
        },
    }
}

/// 列表请求的查询参数
fn list_query(scope: &str, id: &str, opts: ListOptions) -> Vec<(String, String)> {
    let mut query = vec![(format!("{scope}[id]"), id.to_string())];
    if let Some(page) = opts.page {
        query.push(("page".to_string(), page.to_string()));
    }
    if let Some(per_page) = opts.per_page {
        query.push(("per_page".to_string(), per_page.to_string()));
    }
    query
}

fn lookup(scope: &str, id: &str) -> Value {
    json!({ scope: { "id": id } })
}

fn with_properties(scope: &str, id: &str, properties: Value) -> Value {
    json!({ scope: { "id": id }, "properties": properties })
}

/// 负载均衡器集合的 HTTP 实现
#[derive(Debug, Clone)]
pub struct LoadBalancersClient {
    client: KatapultClient,
}

#[async_trait]
impl LoadBalancerApi for LoadBalancersClient {
    async fn list(&self, org: &OrganizationRef, opts: ListOptions) -> Result<Page<LoadBalancer>> {
        let request = self
            .client
            .request(Method::GET, LOAD_BALANCERS_PATH)?
            .query(&list_query("organization", &org.id, opts));
        let resp: LoadBalancersResponse = self.client.execute(request).await?;

        Ok(Page {
            items: resp.load_balancers,
            pagination: resp.pagination,
        })
    }

    async fn create(&self, org: &OrganizationRef, args: LoadBalancerCreateArgs) -> Result<LoadBalancer> {
        let body = with_properties("organization", &org.id, serde_json::to_value(&args)?);
        let request = self.client.request(Method::POST, LOAD_BALANCERS_PATH)?.json(&body);
        let resp: LoadBalancerResponse = self.client.execute(request).await?;
        Ok(resp.load_balancer)
    }

    async fn update(&self, lb: &LoadBalancer, args: LoadBalancerUpdateArgs) -> Result<LoadBalancer> {
        let body = with_properties("load_balancer", &lb.id, serde_json::to_value(&args)?);
        let request = self.client.request(Method::PATCH, LOAD_BALANCER_PATH)?.json(&body);
        let resp: LoadBalancerResponse = self.client.execute(request).await?;
        Ok(resp.load_balancer)
    }

    async fn delete(&self, lb: &LoadBalancer) -> Result<LoadBalancer> {
        let request = self
            .client
            .request(Method::DELETE, LOAD_BALANCER_PATH)?
            .json(&lookup("load_balancer", &lb.id));
        let resp: LoadBalancerResponse = self.client.execute(request).await?;
        Ok(resp.load_balancer)
    }
}

/// 负载均衡规则集合的 HTTP 实现
#[derive(Debug, Clone)]
pub struct LoadBalancerRulesClient {
    client: KatapultClient,
}

#[async_trait]
impl LoadBalancerRuleApi for LoadBalancerRulesClient {
    async fn list(&self, lb: &LoadBalancer, opts: ListOptions) -> Result<Page<LoadBalancerRule>> {
        let request = self
            .client
            .request(Method::GET, RULES_PATH)?
            .query(&list_query("load_balancer", &lb.id, opts));
        let resp: RulesResponse = self.client.execute(request).await?;

        Ok(Page {
            items: resp.load_balancer_rules,
            pagination: resp.pagination,
        })
    }

    async fn create(&self, lb: &LoadBalancer, args: LoadBalancerRuleArgs) -> Result<LoadBalancerRule> {
        let body = with_properties("load_balancer", &lb.id, serde_json::to_value(&args)?);
        let request = self.client.request(Method::POST, RULES_PATH)?.json(&body);
        let resp: RuleResponse = self.client.execute(request).await?;
        Ok(resp.load_balancer_rule)
    }

    async fn update(&self, rule: &LoadBalancerRule, args: LoadBalancerRuleArgs) -> Result<LoadBalancerRule> {
        let body = with_properties("load_balancer_rule", &rule.id, serde_json::to_value(&args)?);
        let request = self.client.request(Method::PATCH, RULE_PATH)?.json(&body);
        let resp: RuleResponse = self.client.execute(request).await?;
        Ok(resp.load_balancer_rule)
    }

    async fn delete(&self, rule: &LoadBalancerRule) -> Result<LoadBalancerRule> {
        let request = self
            .client
            .request(Method::DELETE, RULE_PATH)?
            .json(&lookup("load_balancer_rule", &rule.id));
        let resp: RuleResponse = self.client.execute(request).await?;
        Ok(resp.load_balancer_rule)
    }
}
