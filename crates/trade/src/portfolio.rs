use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use tripcoin_core::account::entity::AccountId;
use tripcoin_core::account::port::AccountStore;
use tripcoin_core::catalog::entity::{Coin, CoinId};
use tripcoin_core::catalog::port::CoinStore;
use tripcoin_core::common::time::TimeProvider;
use tripcoin_core::common::{Page, PageRequest, SortOrder};
use tripcoin_core::portfolio::entity::{
    Holding, HoldingValuation, Portfolio, PortfolioError, PortfolioSettings, PortfolioSortField,
    percentage,
};
use tripcoin_core::portfolio::port::PortfolioStore;
use tripcoin_core::trade::entity::{MIN_TRADE_AMOUNT, OrderSide};

use crate::lock::AccountLocks;
use crate::matcher::Quote;

/// 统计视图中展示的头部持仓数量
const TOP_HOLDINGS: usize = 5;

/// 持仓明细: 持仓本身、币种名称、现价与估值
#[derive(Debug, Clone)]
pub struct HoldingDetail {
    pub holding: Holding,
    pub name: String,
    pub current_price: Decimal,
    pub valuation: HoldingValuation,
}

#[derive(Debug, Clone)]
pub struct PortfolioDetail {
    pub portfolio: Portfolio,
    pub holdings: Vec<HoldingDetail>,
}

/// 按当前价值排名的头部持仓
#[derive(Debug, Clone)]
pub struct TopHolding {
    pub symbol: String,
    pub name: String,
    pub amount: Decimal,
    pub current_value: Decimal,
    /// 占组合总价值的百分比
    pub percentage: Decimal,
}

#[derive(Debug, Clone, Default)]
pub struct PortfolioStats {
    pub total_holdings: usize,
    pub total_value: Decimal,
    pub total_invested: Decimal,
    pub total_profit: Decimal,
    pub total_profit_percentage: Decimal,
    pub top_holdings: Vec<TopHolding>,
    pub performance: Vec<HoldingDetail>,
}

/// 回测 (模拟下单) 输入
#[derive(Debug, Clone)]
pub struct BacktestRequest {
    pub coin_id: CoinId,
    pub side: OrderSide,
    pub amount: Decimal,
    pub price: Decimal,
}

/// 回测结果，不落库
#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub side: OrderSide,
    pub symbol: String,
    pub amount: Decimal,
    pub price: Decimal,
    pub total_value: Decimal,
    pub fee: Decimal,
    pub total_with_fee: Decimal,
    pub new_balance: Decimal,
    pub portfolio_value: Decimal,
    pub portfolio_profit: Decimal,
    pub evaluated_at: DateTime<Utc>,
}

/// # Summary
/// 投资组合服务: 组合的惰性创建、估值、统计、展示设置与回测。
///
/// # Invariants
/// - 写回组合的操作持有账户锁，避免覆盖并发结算刚写入的持仓。
/// - 每次估值只读取一次价格快照。
pub struct PortfolioService {
    portfolios: Arc<dyn PortfolioStore>,
    coins: Arc<dyn CoinStore>,
    accounts: Arc<dyn AccountStore>,
    locks: Arc<AccountLocks>,
    clock: Arc<dyn TimeProvider>,
    fee_rate: Decimal,
}

impl PortfolioService {
    pub fn new(
        portfolios: Arc<dyn PortfolioStore>,
        coins: Arc<dyn CoinStore>,
        accounts: Arc<dyn AccountStore>,
        locks: Arc<AccountLocks>,
        clock: Arc<dyn TimeProvider>,
        fee_rate: Decimal,
    ) -> Self {
        Self {
            portfolios,
            coins,
            accounts,
            locks,
            clock,
            fee_rate,
        }
    }

    /// 一次读取组合内全部持仓币种，已删除的币种不在结果中
    async fn held_coins(&self, portfolio: &Portfolio) -> Result<HashMap<CoinId, Coin>, PortfolioError> {
        Ok(self.coins.get_many(&portfolio.coin_ids()).await?)
    }

    /// # Logic
    /// 在账户锁内读取组合 (不存在时按 `create` 决定是否新建)，按最新价格重估并写回。
    async fn load_revalued(
        &self,
        account_id: &AccountId,
        create: bool,
    ) -> Result<Option<(Portfolio, HashMap<CoinId, Coin>)>, PortfolioError> {
        let _guard = self.locks.acquire(account_id).await;
        let now = self.clock.now();
        let portfolio = match self.portfolios.get(account_id).await? {
            Some(p) => Some(p),
            None if create => Some(Portfolio::new(account_id.clone(), now)),
            None => None,
        };
        let Some(mut portfolio) = portfolio else {
            return Ok(None);
        };
        let coins = self.held_coins(&portfolio).await?;
        portfolio.revalue(&price_snapshot(&coins), now)?;
        self.portfolios.save(&portfolio).await?;
        Ok(Some((portfolio, coins)))
    }

    /// 当前用户的组合，首次访问时创建
    pub async fn my(&self, account_id: &AccountId) -> Result<Portfolio, PortfolioError> {
        let (portfolio, _) = self
            .load_revalued(account_id, true)
            .await?
            .ok_or_else(|| PortfolioError::PortfolioNotFound(account_id.0.clone()))?;
        Ok(portfolio)
    }


    /// 逐个持仓的估值明细，组合不存在时返回 `PortfolioNotFound`
    pub async fn detailed(&self, account_id: &AccountId) -> Result<PortfolioDetail, PortfolioError> {
        let (portfolio, coins) = self
            .load_revalued(account_id, false)
            .await?
            .ok_or_else(|| PortfolioError::PortfolioNotFound(account_id.0.clone()))?;
        let holdings = holding_details(&portfolio, &coins)?;
        Ok(PortfolioDetail { portfolio, holdings })
    }

    /// # Summary
    /// 组合统计。
    ///
    /// # Logic
    /// 1. 无组合时返回全零统计。
    /// 2. 头部持仓按当前价值降序取前 5，附带占比。
    /// 3. 逐币种成绩即全部持仓明细。
    pub async fn stats(&self, account_id: &AccountId) -> Result<PortfolioStats, PortfolioError> {
        let Some((portfolio, coins)) = self.load_revalued(account_id, false).await? else {
            return Ok(PortfolioStats::default());
        };
        let performance = holding_details(&portfolio, &coins)?;

        let mut ranked: Vec<&HoldingDetail> = performance.iter().collect();
        ranked.sort_by(|a, b| b.valuation.current_value.cmp(&a.valuation.current_value));
        let top_holdings = ranked
            .into_iter()
            .take(TOP_HOLDINGS)
            .map(|d| TopHolding {
                symbol: d.holding.symbol.clone(),
                name: d.name.clone(),
                amount: d.holding.amount,
                current_value: d.valuation.current_value,
                percentage: percentage(d.valuation.current_value, portfolio.total_value),
            })
            .collect();

        Ok(PortfolioStats {
            total_holdings: portfolio.holdings.len(),
            total_value: portfolio.total_value,
            total_invested: portfolio.total_invested,
            total_profit: portfolio.total_profit,
            total_profit_percentage: portfolio.total_profit_percentage,
            top_holdings,
            performance,
        })
    }

    /// 部分更新展示设置，组合不存在时先创建
    pub async fn update_settings(
        &self,
        account_id: &AccountId,
        settings: PortfolioSettings,
    ) -> Result<Portfolio, PortfolioError> {
        let _guard = self.locks.acquire(account_id).await;
        let now = self.clock.now();
        let mut portfolio = self
            .portfolios
            .get(account_id)
            .await?
            .unwrap_or_else(|| Portfolio::new(account_id.clone(), now));
        settings.apply(&mut portfolio);
        portfolio.last_updated = now;
        self.portfolios.save(&portfolio).await?;
        Ok(portfolio)
    }

    pub async fn list_public(
        &self,
        sort: PortfolioSortField,
        order: SortOrder,
        page: PageRequest,
    ) -> Result<Page<Portfolio>, PortfolioError> {
        Ok(self.portfolios.list_public(sort, order, page).await?)
    }

    /// 某个用户的公开组合，非公开与不存在一样返回 `PortfolioNotFound`
    pub async fn public_for(&self, account_id: &AccountId) -> Result<Portfolio, PortfolioError> {
        let is_public = self
            .portfolios
            .get(account_id)
            .await?
            .is_some_and(|p| p.is_public);
        if !is_public {
            return Err(PortfolioError::PortfolioNotFound(account_id.0.clone()));
        }
        self.my(account_id).await
    }

    /// # Summary
    /// 回测: 在组合副本上模拟一笔买卖，返回模拟后的余额与组合价值，不写入任何数据。
    ///
    /// # Logic
    /// 1. 校验数量与价格，读取币种与账户。
    /// 2. 按手续费率计算成交额与手续费，买入时检查余额。
    /// 3. 在组合副本上应用买入或卖出，按当前价格快照重估。
    pub async fn backtest(
        &self,
        account_id: &AccountId,
        request: BacktestRequest,
    ) -> Result<BacktestResult, PortfolioError> {
        if request.amount < MIN_TRADE_AMOUNT {
            return Err(PortfolioError::InvalidAmount(request.amount));
        }
        if request.price <= Decimal::ZERO {
            return Err(PortfolioError::InvalidPrice(request.price));
        }
        let coin = self
            .coins
            .get(&request.coin_id)
            .await?
            .ok_or_else(|| PortfolioError::CoinNotFound(request.coin_id.0.clone()))?;
        let account = self
            .accounts
            .get(account_id)
            .await?
            .ok_or_else(|| PortfolioError::AccountNotFound(account_id.0.clone()))?;

        let quote = Quote::compute(request.amount, request.price, self.fee_rate)
            .ok_or_else(|| PortfolioError::InvalidAmount(request.amount))?;
        let total_with_fee = quote.total_with_fee;

        let now = self.clock.now();
        let mut simulated = self
            .portfolios
            .get(account_id)
            .await?
            .unwrap_or_else(|| Portfolio::new(account_id.clone(), now));

        let new_balance = match request.side {
            OrderSide::Buy => {
                if account.balance < total_with_fee {
                    return Err(PortfolioError::InsufficientFunds {
                        required: total_with_fee,
                        actual: account.balance,
                    });
                }
                simulated.apply_buy(&coin.id, &coin.symbol, request.amount, request.price, now)?;
                account.balance - total_with_fee
            }
            OrderSide::Sell => {
                simulated.apply_sell(&coin.id, request.amount, now)?;
                account
                    .balance
                    .checked_add(quote.total_value - quote.fee)
                    .ok_or(PortfolioError::InvalidAmount(request.amount))?
            }
        };

        let coins = self.held_coins(&simulated).await?;
        simulated.revalue(&price_snapshot(&coins), now)?;
        debug!(
            "Backtest for {}: {} {} {} -> value {}",
            account_id, request.side, request.amount, coin.symbol, simulated.total_value
        );

        Ok(BacktestResult {
            side: request.side,
            symbol: coin.symbol,
            amount: request.amount,
            price: request.price,
            total_value: quote.total_value,
            fee: quote.fee,
            total_with_fee,
            new_balance,
            portfolio_value: simulated.total_value,
            portfolio_profit: simulated.total_profit,
            evaluated_at: now,
        })
    }
}

fn price_snapshot(coins: &HashMap<CoinId, Coin>) -> HashMap<CoinId, Decimal> {
    coins
        .iter()
        .map(|(id, coin)| (id.clone(), coin.current_price))
        .collect()
}

/// 按同一份币种快照生成持仓明细，币种已删除的持仓跳过
fn holding_details(
    portfolio: &Portfolio,
    coins: &HashMap<CoinId, Coin>,
) -> Result<Vec<HoldingDetail>, PortfolioError> {
    portfolio
        .holdings
        .iter()
        .filter_map(|holding| coins.get(&holding.coin_id).map(|coin| (holding, coin)))
        .map(|(holding, coin)| {
            Ok(HoldingDetail {
                holding: holding.clone(),
                name: coin.name.clone(),
                current_price: coin.current_price,
                valuation: holding.valuation(coin.current_price)?,
            })
        })
        .collect()
}
