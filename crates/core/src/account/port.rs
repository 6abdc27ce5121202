use async_trait::async_trait;

use super::entity::{Account, AccountId};
use crate::store::error::StoreError;

/// # Summary
/// 账户持久化端口。
///
/// # Invariants
/// - `google_id` 与 `wallet_address` 唯一，重复写入返回 `StoreError::Conflict`。
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// 插入新账户
    async fn insert(&self, account: &Account) -> Result<(), StoreError>;

    /// 覆盖写入账户的全部可变字段
    async fn save(&self, account: &Account) -> Result<(), StoreError>;

    async fn get(&self, id: &AccountId) -> Result<Option<Account>, StoreError>;

    async fn find_by_wallet(&self, wallet_address: &str) -> Result<Option<Account>, StoreError>;

    async fn find_by_google_id(&self, google_id: &str) -> Result<Option<Account>, StoreError>;

    /// 列出全部账户 ID，供定时任务逐个处理
    async fn list_ids(&self) -> Result<Vec<AccountId>, StoreError>;

    /// # Summary
    /// 积分排行榜。
    ///
    /// # Logic
    /// 仅统计活跃账户，按 `point` 降序、`svt_point` 降序排列。
    async fn rankings(&self, limit: u32) -> Result<Vec<Account>, StoreError>;
}
