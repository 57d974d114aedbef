//! 分页列表
//!
//! Katapult 的集合接口按页返回结果。[`list_all`] 顺序拉取所有页面并按页序
//! 拼接，任何一页失败都直接返回错误，调用方不会拿到不完整的列表。

use std::future::Future;

use kce_common::{ListOptions, Page, Result};
use tracing::debug;

/// 拉取完整列表
///
/// 第一页使用默认选项请求，随后根据返回的总页数依次请求第 2..=N 页。
/// 页面之间严格串行，同一时间只有一个请求在进行。
pub async fn list_all<T, F, Fut>(mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(ListOptions) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    let first = fetch(ListOptions::default()).await?;
    let total_pages = first.pagination.total_pages;
    let mut items = first.items;

    for page in 2..=total_pages {
        let next = fetch(ListOptions::page(page)).await?;
        items.extend(next.items);
    }

    debug!("分页列表拉取完成: {} 页, {} 条", total_pages.max(1), items.len());
    Ok(items)
}
