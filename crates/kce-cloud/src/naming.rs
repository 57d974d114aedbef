//! 负载均衡器命名
//!
//! 由集群名、命名空间和服务名推导出确定性的负载均衡器名称。
//! 超出长度上限时从左侧截取前缀，而不是哈希；因此两个前 60 个字符相同的
//! 名称会冲突，这是已知的限制。

use kce_common::DEFAULT_NAMESPACE;

/// 名称前缀
pub const NAME_PREFIX: &str = "k8s";

/// 名称最大长度（字符数）
pub const MAX_NAME_LENGTH: usize = 60;

/// 生成负载均衡器名称
///
/// 形如 `k8s-<cluster>-<namespace>-<service>`，命名空间为 `default`
/// （或为空）时省略。
pub fn load_balancer_name(cluster_name: &str, namespace: &str, service_name: &str) -> String {
    let mut parts = vec![NAME_PREFIX, cluster_name];
    if !namespace.is_empty() && namespace != DEFAULT_NAMESPACE {
        parts.push(namespace);
    }
    parts.push(service_name);

    parts
        .join("-")
        .chars()
        .take(MAX_NAME_LENGTH)
        .collect()
}
