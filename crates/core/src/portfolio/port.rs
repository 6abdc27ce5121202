use async_trait::async_trait;

use super::entity::{Portfolio, PortfolioSortField};
use crate::account::entity::AccountId;
use crate::common::{Page, PageRequest, SortOrder};
use crate::store::error::StoreError;

/// # Summary
/// 投资组合持久化端口。
#[async_trait]
pub trait PortfolioStore: Send + Sync {
    async fn get(&self, account_id: &AccountId) -> Result<Option<Portfolio>, StoreError>;

    /// 写入组合及其全部持仓 (整体替换持仓列表)
    async fn save(&self, portfolio: &Portfolio) -> Result<(), StoreError>;

    /// 公开组合分页列表
    async fn list_public(
        &self,
        sort: PortfolioSortField,
        order: SortOrder,
        page: PageRequest,
    ) -> Result<Page<Portfolio>, StoreError>;
}
