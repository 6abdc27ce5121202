use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

use super::entity::{StatsPeriod, Trade, TradeFilter, TradeId, TradeRequest, TradeStats};
use crate::account::entity::{Account, AccountId};
use crate::account::error::AccountError;
use crate::common::{Page, PageRequest};
use crate::portfolio::entity::{Portfolio, PortfolioError};
use crate::store::error::StoreError;

/// # Summary
/// 交易执行环节中可能发生的错误。
#[derive(Error, Debug)]
pub enum TradeError {
    #[error("参数校验失败: {0}")]
    Validation(String),
    #[error("账户不存在: {0}")]
    AccountNotFound(String),
    #[error("币种不存在: {0}")]
    CoinNotFound(String),
    #[error("订单未找到或不存在: {0}")]
    TradeNotFound(String),
    #[error("可用资金不足. 需要: {required}, 实际: {actual}")]
    InsufficientFunds { required: Decimal, actual: Decimal },
    #[error("持仓不足. 需要: {required}, 持有: {held}")]
    InsufficientHoldings { required: Decimal, held: Decimal },
    #[error("无权访问该订单")]
    Forbidden,
    #[error("订单状态不允许该操作: {0}")]
    InvalidState(String),
    #[error("内部系统错误: {0}")]
    InternalError(String),
}

impl From<StoreError> for TradeError {
    fn from(e: StoreError) -> Self {
        TradeError::InternalError(e.to_string())
    }
}

impl From<AccountError> for TradeError {
    fn from(e: AccountError) -> Self {
        match e {
            AccountError::NotFound(id) => TradeError::AccountNotFound(id),
            AccountError::InsufficientFunds { required, actual } => {
                TradeError::InsufficientFunds { required, actual }
            }
            AccountError::InvalidAmount(_)
            | AccountError::MissionAlreadyCompleted(_)
            | AccountError::Validation(_) => TradeError::Validation(e.to_string()),
            AccountError::Store(inner) => inner.into(),
        }
    }
}

impl From<PortfolioError> for TradeError {
    fn from(e: PortfolioError) -> Self {
        match e {
            PortfolioError::InsufficientHoldings { required, held, .. } => {
                TradeError::InsufficientHoldings { required, held }
            }
            PortfolioError::InsufficientFunds { required, actual } => {
                TradeError::InsufficientFunds { required, actual }
            }
            PortfolioError::InvalidAmount(_) | PortfolioError::InvalidPrice(_) => {
                TradeError::Validation(e.to_string())
            }
            PortfolioError::AccountNotFound(id) => TradeError::AccountNotFound(id),
            PortfolioError::CoinNotFound(id) => TradeError::CoinNotFound(id),
            PortfolioError::PortfolioNotFound(id) => {
                TradeError::InternalError(format!("portfolio missing for {}", id))
            }
            PortfolioError::Internal(msg) => TradeError::InternalError(msg),
        }
    }
}

/// 订单持久化端口
#[async_trait]
pub trait TradeStore: Send + Sync {
    async fn insert(&self, trade: &Trade) -> Result<(), StoreError>;

    async fn get(&self, id: &TradeId) -> Result<Option<Trade>, StoreError>;

    /// 账户自己的订单，按创建时间倒序
    async fn list(
        &self,
        account_id: &AccountId,
        filter: &TradeFilter,
        page: PageRequest,
    ) -> Result<Page<Trade>, StoreError>;

    /// 创建时间不早于 `since` 的已成交订单，`None` 表示全部
    async fn completed_since(
        &self,
        account_id: &AccountId,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Trade>, StoreError>;

    /// # Summary
    /// 撤销订单。
    ///
    /// # Returns
    /// * `Ok(true)` - 订单原为 `Pending` 且已改为 `Cancelled`
    /// * `Ok(false)` - 订单不是 `Pending`，未做修改
    async fn cancel(&self, id: &TradeId, now: DateTime<Utc>) -> Result<bool, StoreError>;
}

/// 一次结算后的账户、组合与订单
#[derive(Debug, Clone)]
pub struct Settlement {
    pub account: Account,
    pub portfolio: Portfolio,
    pub trade: Trade,
}

/// # Summary
/// 结算端口。把一笔 `Pending` 订单原子地应用到账户余额、持仓和订单记录。
///
/// # Invariants
/// - 要么三者全部写入，要么全部回滚。
/// - 订单不是 `Pending` 时返回 `InvalidState`，不做任何修改。
#[async_trait]
pub trait SettlementStore: Send + Sync {
    async fn settle(&self, trade_id: &TradeId, now: DateTime<Utc>) -> Result<Settlement, TradeError>;
}

/// # Summary
/// 核心交易服务抽象接口。
/// HTTP 层通过此端口为账户下单、撤单和查询订单。
///
/// # Invariants
/// - 此接口必须是异步且线程安全的 (`Send + Sync`)。
/// - 同一账户的校验与结算串行执行。
#[async_trait]
pub trait TradePort: Send + Sync {
    /// 提交一笔新订单
    ///
    /// # Arguments
    /// * `account_id` - 下单账户
    /// * `request` - 已解析的下单意图
    ///
    /// # Returns
    /// * `Ok(Trade)` - 市价单返回 `Completed`，其余返回 `Pending`
    /// * `Err(TradeError)` - 校验失败、资金或持仓不足、结算失败
    async fn submit(&self, account_id: &AccountId, request: TradeRequest) -> Result<Trade, TradeError>;

    /// 结算一笔挂起的订单 (供外部触发器使用)
    async fn settle(&self, trade_id: &TradeId) -> Result<Trade, TradeError>;

    /// 撤销一笔挂起的订单，仅限订单所有者
    async fn cancel(&self, account_id: &AccountId, trade_id: &TradeId) -> Result<Trade, TradeError>;

    /// 查询单笔订单，仅限订单所有者
    async fn get(&self, account_id: &AccountId, trade_id: &TradeId) -> Result<Trade, TradeError>;

    async fn list(
        &self,
        account_id: &AccountId,
        filter: TradeFilter,
        page: PageRequest,
    ) -> Result<Page<Trade>, TradeError>;

    async fn stats(&self, account_id: &AccountId, period: StatsPeriod) -> Result<TradeStats, TradeError>;
}
