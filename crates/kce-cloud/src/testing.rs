//! 测试替身：内存中的分页 Katapult 集合

use async_trait::async_trait;
use kce_common::{
    Error, IpAddress, ListOptions, LoadBalancer, LoadBalancerCreateArgs, LoadBalancerRule,
    LoadBalancerRuleArgs, LoadBalancerUpdateArgs, OrganizationRef, Page, Pagination, Result,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::api::{LoadBalancerApi, LoadBalancerRuleApi};

/// 测试替身的默认每页条目数，刻意取小值以覆盖多页场景
pub const FAKE_PER_PAGE: u32 = 2;

/// 按页切分 `items`；`fails` 命中的条目让该页返回错误
pub fn paginate<T: Clone>(
    items: &[T],
    opts: ListOptions,
    default_per_page: u32,
    fails: impl Fn(&T) -> bool,
) -> Result<Page<T>> {
    let per_page = opts.per_page.unwrap_or(default_per_page).max(1) as usize;
    let page = opts.page.unwrap_or(1).max(1) as usize;
    let start = ((page - 1) * per_page).min(items.len());
    let end = (page * per_page).min(items.len());

    let mut out = Vec::with_capacity(end - start);
    for (i, item) in items.iter().enumerate().take(end).skip(start) {
        if fails(item) {
            return Err(Error::Transport(format!("error from {i}")));
        }
        out.push(item.clone());
    }

    Ok(Page {
        items: out,
        pagination: Pagination {
            current_page: page as u32,
            per_page: per_page as u32,
            total_pages: ((items.len() + per_page - 1) / per_page) as u32,
            total: items.len() as u64,
        },
    })
}

fn api_error(message: &str) -> Error {
    Error::Api {
        status: 422,
        code: "validation_error".to_string(),
        message: message.to_string(),
    }
}

/// 内存中的负载均衡器集合，ID 为 `error` 的条目会让所在页失败
#[derive(Default)]
pub struct FakeLoadBalancers {
    items: Mutex<Vec<LoadBalancer>>,
    created: Mutex<Vec<LoadBalancerCreateArgs>>,
    deleted: Mutex<Vec<String>>,
    next_id: AtomicUsize,
}

impl FakeLoadBalancers {
    pub fn with(items: Vec<LoadBalancer>) -> Self {
        Self {
            items: Mutex::new(items),
            ..Default::default()
        }
    }

    pub fn items(&self) -> Vec<LoadBalancer> {
        self.items.lock().unwrap().clone()
    }

    pub fn created(&self) -> Vec<LoadBalancerCreateArgs> {
        self.created.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl LoadBalancerApi for FakeLoadBalancers {
    async fn list(&self, _org: &OrganizationRef, opts: ListOptions) -> Result<Page<LoadBalancer>> {
        let items = self.items();
        paginate(&items, opts, FAKE_PER_PAGE, |lb| lb.id == "error")
    }

    async fn create(&self, _org: &OrganizationRef, args: LoadBalancerCreateArgs) -> Result<LoadBalancer> {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.created.lock().unwrap().push(args.clone());

        let lb = LoadBalancer {
            id: format!("lb_{n}"),
            name: args.name,
            resource_type: args.resource_type,
            resource_ids: args.resource_ids,
            ip_address: Some(IpAddress {
                id: format!("ip_{n}"),
                address: format!("10.0.0.{n}"),
            }),
            data_center: Some(args.data_center),
        };
        self.items.lock().unwrap().push(lb.clone());
        Ok(lb)
    }

    async fn update(&self, lb: &LoadBalancer, args: LoadBalancerUpdateArgs) -> Result<LoadBalancer> {
        let mut items = self.items.lock().unwrap();
        let item = items
            .iter_mut()
            .find(|item| item.id == lb.id)
            .ok_or_else(|| api_error("tried to update non-existent element"))?;

        if let Some(name) = args.name {
            item.name = name;
        }
        if let Some(resource_type) = args.resource_type {
            item.resource_type = resource_type;
        }
        if let Some(resource_ids) = args.resource_ids {
            item.resource_ids = resource_ids;
        }
        Ok(item.clone())
    }

    async fn delete(&self, lb: &LoadBalancer) -> Result<LoadBalancer> {
        let mut items = self.items.lock().unwrap();
        let pos = items
            .iter()
            .position(|item| item.id == lb.id)
            .ok_or_else(|| api_error("tried to delete non-existent element"))?;

        self.deleted.lock().unwrap().push(lb.id.clone());
        Ok(items.remove(pos))
    }
}

/// 对规则集合的一次写操作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleCall {
    Create(u16),
    Update(String, u16),
    Delete(String),
}

/// 内存中的规则集合
///
/// 只模拟单个负载均衡器下的规则；`fail_port` 命中的监听端口在写操作时失败。
#[derive(Default)]
pub struct FakeRules {
    items: Mutex<Vec<LoadBalancerRule>>,
    calls: Mutex<Vec<RuleCall>>,
    fail_port: Mutex<Option<u16>>,
    next_id: AtomicUsize,
}

impl FakeRules {
    pub fn with(items: Vec<LoadBalancerRule>) -> Self {
        Self {
            items: Mutex::new(items),
            ..Default::default()
        }
    }

    pub fn fail_on_port(self, port: u16) -> Self {
        *self.fail_port.lock().unwrap() = Some(port);
        self
    }

    pub fn items(&self) -> Vec<LoadBalancerRule> {
        self.items.lock().unwrap().clone()
    }

    pub fn calls(&self) -> Vec<RuleCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn listen_ports(&self) -> Vec<u16> {
        let mut ports: Vec<u16> = self.items().iter().map(|r| r.listen_port).collect();
        ports.sort_unstable();
        ports
    }

    fn check(&self, port: u16) -> Result<()> {
        if *self.fail_port.lock().unwrap() == Some(port) {
            return Err(api_error(&format!("rejected port {port}")));
        }
        Ok(())
    }
}

fn apply_args(rule: &mut LoadBalancerRule, args: LoadBalancerRuleArgs) {
    rule.algorithm = args.algorithm;
    rule.listen_port = args.listen_port;
    rule.destination_port = args.destination_port;
    rule.protocol = args.protocol;
    rule.proxy_protocol = args.proxy_protocol;
    rule.check_enabled = args.check_enabled;
    rule.check_protocol = Some(args.check_protocol);
    rule.check_path = args.check_path;
    rule.check_timeout = Some(args.check_timeout);
    rule.check_interval = Some(args.check_interval);
    rule.check_rise = Some(args.check_rise);
    rule.check_fall = Some(args.check_fall);
}

#[async_trait]
impl LoadBalancerRuleApi for FakeRules {
    async fn list(&self, _lb: &LoadBalancer, opts: ListOptions) -> Result<Page<LoadBalancerRule>> {
        let items = self.items();
        paginate(&items, opts, FAKE_PER_PAGE, |rule| rule.id == "error")
    }

    async fn create(&self, _lb: &LoadBalancer, args: LoadBalancerRuleArgs) -> Result<LoadBalancerRule> {
        self.check(args.listen_port)?;
        self.calls.lock().unwrap().push(RuleCall::Create(args.listen_port));

        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let mut rule = LoadBalancerRule {
            id: format!("lbrule_new_{n}"),
            ..Default::default()
        };
        apply_args(&mut rule, args);
        self.items.lock().unwrap().push(rule.clone());
        Ok(rule)
    }

    async fn update(&self, rule: &LoadBalancerRule, args: LoadBalancerRuleArgs) -> Result<LoadBalancerRule> {
        self.check(args.listen_port)?;
        self.calls
            .lock()
            .unwrap()
            .push(RuleCall::Update(rule.id.clone(), args.listen_port));

        let mut items = self.items.lock().unwrap();
        let item = items
            .iter_mut()
            .find(|item| item.id == rule.id)
            .ok_or_else(|| api_error("tried to update non-existent element"))?;
        apply_args(item, args);
        Ok(item.clone())
    }

    async fn delete(&self, rule: &LoadBalancerRule) -> Result<LoadBalancerRule> {
        self.check(rule.listen_port)?;
        self.calls.lock().unwrap().push(RuleCall::Delete(rule.id.clone()));

        let mut items = self.items.lock().unwrap();
        let pos = items
            .iter()
            .position(|item| item.id == rule.id)
            .ok_or_else(|| api_error("tried to delete non-existent element"))?;
        Ok(items.remove(pos))
    }
}
