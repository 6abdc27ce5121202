use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

pub mod time;

/// 单页最大条目数，超出的请求会被截断。
pub const MAX_PAGE_LIMIT: u32 = 100;

/// 默认单页条目数。
pub const DEFAULT_PAGE_LIMIT: u32 = 20;

/// # Summary
/// 分页请求参数。
///
/// # Invariants
/// - `page` 从 1 开始计数。
/// - `limit` 位于 `1..=MAX_PAGE_LIMIT` 区间。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    /// 构建分页参数，越界值会被钳制到合法区间。
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit
                .unwrap_or(DEFAULT_PAGE_LIMIT)
                .clamp(1, MAX_PAGE_LIMIT),
        }
    }

    /// 需要跳过的记录数
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// # Summary
/// 分页元信息，随列表响应一并返回。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u64,
    pub total_items: u64,
    pub items_per_page: u32,
}

impl Pagination {
    pub fn new(request: PageRequest, total_items: u64) -> Self {
        Self {
            current_page: request.page,
            total_pages: total_items.div_ceil(u64::from(request.limit)),
            total_items,
            items_per_page: request.limit,
        }
    }
}

/// # Summary
/// 一页查询结果。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total_items: u64) -> Self {
        Self {
            items,
            pagination: Pagination::new(request, total_items),
        }
    }

    /// 转换页内元素类型，保留分页信息
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}

/// # Summary
/// 排序方向。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// SQL 排序关键字
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(format!("Unknown sort order: {}", s)),
        }
    }
}
