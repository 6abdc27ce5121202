use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, warn};
use tripcoin_core::account::entity::AccountId;
use tripcoin_core::account::port::AccountStore;
use tripcoin_core::catalog::port::CoinStore;
use tripcoin_core::common::time::TimeProvider;
use tripcoin_core::common::{Page, PageRequest};
use tripcoin_core::portfolio::port::PortfolioStore;
use tripcoin_core::trade::entity::{
    OrderSide, OrderType, StatsPeriod, Trade, TradeFilter, TradeId, TradeRequest, TradeStats,
    TradeStatus,
};
use tripcoin_core::trade::port::{SettlementStore, TradeError, TradePort, TradeStore};

use crate::lock::AccountLocks;
use crate::matcher::{Quote, effective_price};

/// 交易服务依赖的存储端口集合
pub struct TradeStores {
    pub accounts: Arc<dyn AccountStore>,
    pub coins: Arc<dyn CoinStore>,
    pub portfolios: Arc<dyn PortfolioStore>,
    pub trades: Arc<dyn TradeStore>,
    pub settlement: Arc<dyn SettlementStore>,
}

/// # Summary
/// `TradeService` 是模拟交易的入口调度者，实现了 `TradePort`。
/// 负责下单前校验、订单落库、市价单即时结算以及撤单。
///
/// # Invariants
/// - 同一账户的资金/持仓校验与结算在同一把账户锁内完成。
/// - 结算失败时订单保持 `Pending`，错误原样返回调用方。
pub struct TradeService {
    stores: TradeStores,
    locks: Arc<AccountLocks>,
    clock: Arc<dyn TimeProvider>,
    fee_rate: Decimal,
}

impl TradeService {
    pub fn new(
        stores: TradeStores,
        locks: Arc<AccountLocks>,
        clock: Arc<dyn TimeProvider>,
        fee_rate: Decimal,
    ) -> Self {
        Self {
            stores,
            locks,
            clock,
            fee_rate,
        }
    }

    async fn load_trade(&self, trade_id: &TradeId) -> Result<Trade, TradeError> {
        self.stores
            .trades
            .get(trade_id)
            .await?
            .ok_or_else(|| TradeError::TradeNotFound(trade_id.0.clone()))
    }

    async fn load_owned(&self, account_id: &AccountId, trade_id: &TradeId) -> Result<Trade, TradeError> {
        let trade = self.load_trade(trade_id).await?;
        if &trade.account_id != account_id {
            return Err(TradeError::Forbidden);
        }
        Ok(trade)
    }

    /// 在已持有账户锁的前提下结算
    async fn settle_locked(&self, trade_id: &TradeId) -> Result<Trade, TradeError> {
        let settlement = self
            .stores
            .settlement
            .settle(trade_id, self.clock.now())
            .await
            .inspect_err(|e| warn!("Settlement of trade {} failed: {}", trade_id, e))?;
        Ok(settlement.trade)
    }
}

#[async_trait]
impl TradePort for TradeService {
    /// # Logic
    /// 1. 校验下单意图 (数量下限、限价/止损价为正)。
    /// 2. 获取账户锁，读取账户与活跃币种。
    /// 3. 计价: 限价单取限价，其余取现价；手续费按费率计算。
    /// 4. 买单检查余额是否覆盖成交额加手续费，卖单检查持仓数量。
    /// 5. 订单以 `Pending` 落库。
    /// 6. 市价单在同一把锁内立即结算。
    async fn submit(&self, account_id: &AccountId, request: TradeRequest) -> Result<Trade, TradeError> {
        request.validate().map_err(TradeError::Validation)?;

        let _guard = self.locks.acquire(account_id).await;
        let account = self
            .stores
            .accounts
            .get(account_id)
            .await?
            .ok_or_else(|| TradeError::AccountNotFound(account_id.0.clone()))?;
        let coin = self
            .stores
            .coins
            .get(&request.coin_id)
            .await?
            .filter(|c| c.is_active)
            .ok_or_else(|| TradeError::CoinNotFound(request.coin_id.0.clone()))?;

        let price = effective_price(&request.order_type, coin.current_price);
        let quote = Quote::compute(request.amount, price, self.fee_rate)
            .ok_or_else(|| TradeError::Validation("order value overflows".into()))?;

        match request.side {
            OrderSide::Buy => {
                let required = quote.total_with_fee;
                if account.balance < required {
                    return Err(TradeError::InsufficientFunds {
                        required,
                        actual: account.balance,
                    });
                }
            }
            OrderSide::Sell => {
                let held = self
                    .stores
                    .portfolios
                    .get(account_id)
                    .await?
                    .map_or(Decimal::ZERO, |p| p.held_amount(&coin.id));
                if held < request.amount {
                    return Err(TradeError::InsufficientHoldings {
                        required: request.amount,
                        held,
                    });
                }
            }
        }

        let now = self.clock.now();
        let trade = Trade {
            id: TradeId(uuid::Uuid::new_v4().to_string()),
            account_id: account_id.clone(),
            coin_id: coin.id.clone(),
            symbol: coin.symbol.clone(),
            side: request.side,
            amount: request.amount,
            price: quote.price,
            total_value: quote.total_value,
            fee: quote.fee,
            order_type: request.order_type,
            status: TradeStatus::Pending,
            notes: request.notes.unwrap_or_default(),
            executed_at: None,
            created_at: now,
            updated_at: now,
        };
        self.stores.trades.insert(&trade).await?;
        info!(
            "Order {} accepted: {} {} {} @ {} ({})",
            trade.id,
            trade.side,
            trade.amount,
            trade.symbol,
            trade.price,
            trade.order_type.kind()
        );

        if trade.order_type == OrderType::Market {
            return self.settle_locked(&trade.id).await;
        }
        Ok(trade)
    }

    async fn settle(&self, trade_id: &TradeId) -> Result<Trade, TradeError> {
        let trade = self.load_trade(trade_id).await?;
        let _guard = self.locks.acquire(&trade.account_id).await;
        self.settle_locked(trade_id).await
    }

    /// # Logic
    /// 仅订单所有者可撤单；只有 `Pending` 订单可以撤销，其余状态返回 `InvalidState`。
    async fn cancel(&self, account_id: &AccountId, trade_id: &TradeId) -> Result<Trade, TradeError> {
        let _guard = self.locks.acquire(account_id).await;
        let mut trade = self.load_owned(account_id, trade_id).await?;
        if trade.status != TradeStatus::Pending {
            return Err(TradeError::InvalidState(format!(
                "cannot cancel a {} order",
                trade.status
            )));
        }

        let now = self.clock.now();
        if !self.stores.trades.cancel(trade_id, now).await? {
            let current = self.load_trade(trade_id).await?;
            return Err(TradeError::InvalidState(format!(
                "cannot cancel a {} order",
                current.status
            )));
        }
        trade.status = TradeStatus::Cancelled;
        trade.updated_at = now;
        info!("Order {} cancelled by {}", trade_id, account_id);
        Ok(trade)
    }

    async fn get(&self, account_id: &AccountId, trade_id: &TradeId) -> Result<Trade, TradeError> {
        self.load_owned(account_id, trade_id).await
    }

    async fn list(
        &self,
        account_id: &AccountId,
        filter: TradeFilter,
        page: PageRequest,
    ) -> Result<Page<Trade>, TradeError> {
        Ok(self.stores.trades.list(account_id, &filter, page).await?)
    }

    async fn stats(&self, account_id: &AccountId, period: StatsPeriod) -> Result<TradeStats, TradeError> {
        let since = period.cutoff(self.clock.now());
        let trades = self.stores.trades.completed_since(account_id, since).await?;
        Ok(TradeStats::from_trades(period, &trades))
    }
}
