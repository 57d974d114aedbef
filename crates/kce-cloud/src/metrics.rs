//! 协调指标
//!
//! 统计协调过程中对远程资源的写操作次数，以 Prometheus 格式导出。

use prometheus::{IntCounter, Registry};

/// 协调指标集合
#[derive(Clone)]
pub struct ReconcileMetrics {
    /// 创建的负载均衡器数
    pub load_balancers_created: IntCounter,
    /// 删除的负载均衡器数
    pub load_balancers_deleted: IntCounter,
    /// 创建的规则数
    pub rules_created: IntCounter,
    /// 更新的规则数
    pub rules_updated: IntCounter,
    /// 清理的规则数
    pub rules_deleted: IntCounter,
}

impl ReconcileMetrics {
    /// 创建指标但不注册
    pub fn new() -> prometheus::Result<Self> {
        Ok(Self {
            load_balancers_created: IntCounter::new(
                "kce_load_balancers_created_total",
                "Total number of load balancers created",
            )?,
            load_balancers_deleted: IntCounter::new(
                "kce_load_balancers_deleted_total",
                "Total number of load balancers deleted",
            )?,
            rules_created: IntCounter::new(
                "kce_rules_created_total",
                "Total number of load balancer rules created",
            )?,
            rules_updated: IntCounter::new(
                "kce_rules_updated_total",
                "Total number of load balancer rules updated",
            )?,
            rules_deleted: IntCounter::new(
                "kce_rules_deleted_total",
                "Total number of stale load balancer rules deleted",
            )?,
        })
    }

    /// 创建指标并注册到 `registry`
    ///
    /// 同一个 registry 只能注册一次。
    pub fn register(registry: &Registry) -> prometheus::Result<Self> {
        let metrics = Self::new()?;

        registry.register(Box::new(metrics.load_balancers_created.clone()))?;
        registry.register(Box::new(metrics.load_balancers_deleted.clone()))?;
        registry.register(Box::new(metrics.rules_created.clone()))?;
        registry.register(Box::new(metrics.rules_updated.clone()))?;
        registry.register(Box::new(metrics.rules_deleted.clone()))?;

        Ok(metrics)
    }
}

impl Default for ReconcileMetrics {
    /// 未注册的指标，指标名称固定且合法
    fn default() -> Self {
        Self::new().expect("指标定义无效")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_exposes_counters() {
        let registry = Registry::new();
        let metrics = ReconcileMetrics::register(&registry).unwrap();
        metrics.rules_created.inc_by(2);

        let names: Vec<String> = registry
            .gather()
            .iter()
            .map(|family| family.get_name().to_string())
            .collect();

        assert!(names.contains(&"kce_rules_created_total".to_string()));
        assert!(names.contains(&"kce_load_balancers_deleted_total".to_string()));
        assert_eq!(metrics.rules_created.get(), 2);
    }

    #[test]
    fn test_default_starts_at_zero() {
        let metrics = ReconcileMetrics::default();
        assert_eq!(metrics.load_balancers_created.get(), 0);
        assert_eq!(metrics.rules_deleted.get(), 0);
    }

    #[test]
    fn test_double_registration_fails() {
        let registry = Registry::new();
        ReconcileMetrics::register(&registry).unwrap();
        assert!(ReconcileMetrics::register(&registry).is_err());
    }
}
