use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::SqlitePool;
use tracing::{debug, info};
use tripcoin_core::portfolio::entity::Portfolio;
use tripcoin_core::trade::entity::{OrderSide, TradeId, TradeStatus};
use tripcoin_core::trade::port::{Settlement, SettlementStore, TradeError};

use crate::account::{load_account, write_account};
use crate::coin::load_prices;
use crate::db::{Database, db_err};
use crate::portfolio::{load_portfolio, write_portfolio};
use crate::trade::{load_trade, mark_completed};

/// # Summary
/// 基于单个 SQLite 事务的结算实现。
///
/// # Invariants
/// - 事务期间只使用事务连接，不再向连接池申请连接。
/// - 任一步失败时事务随 `tx` 释放而回滚，订单保持原状态。
pub struct SqliteSettlementStore {
    pool: SqlitePool,
}

impl SqliteSettlementStore {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }
}

#[async_trait]
impl SettlementStore for SqliteSettlementStore {
    /// # Logic
    /// 1. 读取订单，非 `Pending` 直接拒绝。
    /// 2. 读取账户与组合 (组合不存在时新建)。
    /// 3. 买入: 扣除成交额加手续费，再记入持仓；卖出: 先扣减持仓，再入账成交额减手续费。
    /// 4. 一次读取全部持仓币种的现价并重估组合。
    /// 5. 写回账户、组合，并把订单置为 `Completed`。
    /// 6. 提交事务。
    async fn settle(&self, trade_id: &TradeId, now: DateTime<Utc>) -> Result<Settlement, TradeError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let mut trade = load_trade(&mut tx, trade_id)
            .await?
            .ok_or_else(|| TradeError::TradeNotFound(trade_id.0.clone()))?;
        if trade.status != TradeStatus::Pending {
            return Err(TradeError::InvalidState(format!(
                "trade {} is {}",
                trade.id, trade.status
            )));
        }

        let mut account = load_account(&mut tx, &trade.account_id)
            .await?
            .ok_or_else(|| TradeError::AccountNotFound(trade.account_id.0.clone()))?;
        let mut portfolio = load_portfolio(&mut tx, &trade.account_id)
            .await?
            .unwrap_or_else(|| Portfolio::new(trade.account_id.clone(), now));

        let cash = trade
            .settlement_amount()
            .ok_or_else(|| TradeError::Validation(format!("trade {} value overflows", trade.id)))?;
        match trade.side {
            OrderSide::Buy => {
                if cash > Decimal::ZERO {
                    account.withdraw(cash)?;
                }
                portfolio.apply_buy(&trade.coin_id, &trade.symbol, trade.amount, trade.price, now)?;
            }
            OrderSide::Sell => {
                portfolio.apply_sell(&trade.coin_id, trade.amount, now)?;
                if cash > Decimal::ZERO {
                    account.deposit(cash)?;
                }
            }
        }

        let prices = load_prices(&mut tx, &portfolio.coin_ids()).await?;
        portfolio.revalue(&prices, now)?;
        account.updated_at = now;

        write_account(&mut tx, &account).await?;
        write_portfolio(&mut tx, &portfolio).await?;
        if !mark_completed(&mut tx, &trade.id, now).await? {
            return Err(TradeError::InvalidState(format!(
                "trade {} is no longer pending",
                trade.id
            )));
        }
        tx.commit().await.map_err(db_err)?;

        trade.status = TradeStatus::Completed;
        trade.executed_at = Some(now);
        trade.updated_at = now;
        debug!(
            "Settled trade {}: balance now {}, portfolio value {}",
            trade.id, account.balance, portfolio.total_value
        );
        info!(
            "Trade {} completed: {} {} {} @ {}",
            trade.id, trade.side, trade.amount, trade.symbol, trade.price
        );
        Ok(Settlement {
            account,
            portfolio,
            trade,
        })
    }
}
