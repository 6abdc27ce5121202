use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

use super::entity::{Coin, CoinId, CoinQuery, PricePoint, TrendingKind};
use crate::common::{Page, PageRequest};
use crate::store::error::StoreError;

/// # Summary
/// 币种目录持久化端口。
///
/// # Invariants
/// - 价格历史只追加，不修改也不删除。
/// - 除 `get` 与 `get_many` 外，读接口只返回活跃币种。
#[async_trait]
pub trait CoinStore: Send + Sync {
    /// 插入新币种，并写入第一条价格历史
    async fn insert(&self, coin: &Coin) -> Result<(), StoreError>;

    /// # Summary
    /// 覆盖写入币种。
    ///
    /// # Arguments
    /// * `price_sample` - 若为 `Some`，同一事务内追加一条价格历史
    async fn save(&self, coin: &Coin, price_sample: Option<PricePoint>) -> Result<(), StoreError>;

    async fn get(&self, id: &CoinId) -> Result<Option<Coin>, StoreError>;

    /// 代码大小写不敏感，仅匹配活跃币种
    async fn find_by_symbol(&self, symbol: &str) -> Result<Option<Coin>, StoreError>;

    async fn list(&self, query: &CoinQuery, page: PageRequest) -> Result<Page<Coin>, StoreError>;

    /// 按市值降序的热门币种
    async fn popular(&self, limit: u32) -> Result<Vec<Coin>, StoreError>;

    /// 按 24 小时涨跌幅排序的涨跌榜
    async fn trending(&self, kind: TrendingKind, limit: u32) -> Result<Vec<Coin>, StoreError>;

    async fn search(&self, query: &str, limit: u32) -> Result<Vec<Coin>, StoreError>;

    /// 按时间升序返回 `since` 之后的价格历史，`None` 返回全部
    async fn price_history(
        &self,
        id: &CoinId,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<PricePoint>, StoreError>;

    /// # Summary
    /// 一次查询读取多个币种，保证同一次估值使用一致的价格与名称快照。
    ///
    /// # Returns
    /// 已删除的币种不会出现在结果中。
    async fn get_many(&self, ids: &[CoinId]) -> Result<HashMap<CoinId, Coin>, StoreError>;
}
