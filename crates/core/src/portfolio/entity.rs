use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use utoipa::ToSchema;

use crate::account::entity::AccountId;
use crate::catalog::entity::CoinId;
use crate::store::error::StoreError;

/// # Summary
/// 持仓账本错误。
#[derive(Error, Debug, PartialEq)]
pub enum PortfolioError {
    #[error("持仓不足. 币种: {coin_id}, 需要: {required}, 持有: {held}")]
    InsufficientHoldings {
        coin_id: String,
        required: Decimal,
        held: Decimal,
    },
    #[error("数量必须为正数: {0}")]
    InvalidAmount(Decimal),
    #[error("价格不能为负: {0}")]
    InvalidPrice(Decimal),
    #[error("投资组合不存在: {0}")]
    PortfolioNotFound(String),
    #[error("账户不存在: {0}")]
    AccountNotFound(String),
    #[error("币种不存在: {0}")]
    CoinNotFound(String),
    #[error("余额不足. 需要: {required}, 实际: {actual}")]
    InsufficientFunds { required: Decimal, actual: Decimal },
    #[error("内部系统错误: {0}")]
    Internal(String),
}

impl From<StoreError> for PortfolioError {
    fn from(e: StoreError) -> Self {
        PortfolioError::Internal(e.to_string())
    }
}

/// # Summary
/// 单个币种的持仓。
///
/// # Invariants
/// - `average_buy_price * amount` 约等于 `total_invested`。
/// - `amount` 大于零，归零的持仓会从组合中移除。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub coin_id: CoinId,
    pub symbol: String,
    pub amount: Decimal,
    pub average_buy_price: Decimal,
    pub total_invested: Decimal,
    pub last_updated: DateTime<Utc>,
}

/// 单个持仓按现价计算的估值
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoldingValuation {
    pub current_value: Decimal,
    pub profit: Decimal,
    pub profit_percentage: Decimal,
}

impl Holding {
    /// 按现价估值，市值溢出时返回 `InvalidPrice`
    pub fn valuation(&self, current_price: Decimal) -> Result<HoldingValuation, PortfolioError> {
        let current_value = self
            .amount
            .checked_mul(current_price)
            .ok_or(PortfolioError::InvalidPrice(current_price))?;
        let profit = current_value
            .checked_sub(self.total_invested)
            .ok_or(PortfolioError::InvalidPrice(current_price))?;
        Ok(HoldingValuation {
            current_value,
            profit,
            profit_percentage: percentage(profit, self.total_invested),
        })
    }
}

/// 组合盈亏状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProfitStatus {
    Profit,
    Loss,
    Neutral,
}

/// # Summary
/// 账户的投资组合，与账户一一对应，首次访问时惰性创建。
///
/// # Invariants
/// - 同一币种最多只有一条持仓，持仓保持插入顺序。
/// - `total_*` 汇总字段是缓存快照，使用前必须通过 `revalue` 重新计算。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    pub account_id: AccountId,
    pub holdings: Vec<Holding>,
    pub total_value: Decimal,
    pub total_invested: Decimal,
    pub total_profit: Decimal,
    pub total_profit_percentage: Decimal,
    pub last_updated: DateTime<Utc>,
    pub is_public: bool,
    pub description: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Portfolio {
    pub fn new(account_id: AccountId, now: DateTime<Utc>) -> Self {
        Self {
            account_id,
            holdings: Vec::new(),
            total_value: Decimal::ZERO,
            total_invested: Decimal::ZERO,
            total_profit: Decimal::ZERO,
            total_profit_percentage: Decimal::ZERO,
            last_updated: now,
            is_public: false,
            description: String::new(),
            tags: Vec::new(),
            created_at: now,
        }
    }

    pub fn holding(&self, coin_id: &CoinId) -> Option<&Holding> {
        self.holdings.iter().find(|h| &h.coin_id == coin_id)
    }

    /// 持有数量，无持仓时为零
    pub fn held_amount(&self, coin_id: &CoinId) -> Decimal {
        self.holding(coin_id).map_or(Decimal::ZERO, |h| h.amount)
    }

    pub fn coin_ids(&self) -> Vec<CoinId> {
        self.holdings.iter().map(|h| h.coin_id.clone()).collect()
    }

    /// # Summary
    /// 记入一笔买入。
    ///
    /// # Logic
    /// 1. 已有持仓: 按成交量加权重新计算均价，累加数量与投入成本。
    /// 2. 无持仓: 以成交价为均价追加新持仓。
    /// 3. 任一步数值溢出返回 `InvalidAmount`，持仓保持不变。
    pub fn apply_buy(
        &mut self,
        coin_id: &CoinId,
        symbol: &str,
        amount: Decimal,
        price: Decimal,
        now: DateTime<Utc>,
    ) -> Result<(), PortfolioError> {
        if amount <= Decimal::ZERO {
            return Err(PortfolioError::InvalidAmount(amount));
        }
        if price.is_sign_negative() {
            return Err(PortfolioError::InvalidPrice(price));
        }
        let overflow = || PortfolioError::InvalidAmount(amount);
        let cost = amount.checked_mul(price).ok_or_else(overflow)?;

        if let Some(holding) = self.holdings.iter_mut().find(|h| &h.coin_id == coin_id) {
            let total_invested = holding
                .total_invested
                .checked_add(cost)
                .ok_or_else(overflow)?;
            let total_amount = holding.amount.checked_add(amount).ok_or_else(overflow)?;
            holding.average_buy_price = total_invested
                .checked_div(total_amount)
                .ok_or_else(overflow)?;
            holding.amount = total_amount;
            holding.total_invested = total_invested;
            holding.last_updated = now;
        } else {
            self.holdings.push(Holding {
                coin_id: coin_id.clone(),
                symbol: symbol.to_string(),
                amount,
                average_buy_price: price,
                total_invested: cost,
                last_updated: now,
            });
        }
        Ok(())
    }

    /// # Summary
    /// 记入一笔卖出。
    ///
    /// # Logic
    /// 1. 无持仓或数量不足返回 `InsufficientHoldings`，持仓保持不变。
    /// 2. 扣减数量，归零则移除持仓。
    /// 3. 否则按原均价重算剩余投入成本，保持成本基础不变。
    pub fn apply_sell(
        &mut self,
        coin_id: &CoinId,
        amount: Decimal,
        now: DateTime<Utc>,
    ) -> Result<(), PortfolioError> {
        if amount <= Decimal::ZERO {
            return Err(PortfolioError::InvalidAmount(amount));
        }
        let Some(index) = self.holdings.iter().position(|h| &h.coin_id == coin_id) else {
            return Err(PortfolioError::InsufficientHoldings {
                coin_id: coin_id.0.clone(),
                required: amount,
                held: Decimal::ZERO,
            });
        };

        let holding = &mut self.holdings[index];
        if holding.amount < amount {
            return Err(PortfolioError::InsufficientHoldings {
                coin_id: coin_id.0.clone(),
                required: amount,
                held: holding.amount,
            });
        }

        let remaining = holding.amount - amount;
        if remaining <= Decimal::ZERO {
            self.holdings.remove(index);
        } else {
            let total_invested = holding
                .average_buy_price
                .checked_mul(remaining)
                .ok_or(PortfolioError::InvalidAmount(amount))?;
            holding.amount = remaining;
            holding.total_invested = total_invested;
            holding.last_updated = now;
        }
        Ok(())
    }

    /// # Summary
    /// 按给定价格快照重新计算组合汇总。
    ///
    /// # Arguments
    /// * `prices` - 同一次读取得到的币种现价，缺失的币种视为已删除
    ///
    /// # Logic
    /// 1. 对有价格的持仓累加 `amount * price` 与 `total_invested`。
    /// 2. 计算总盈亏及盈亏百分比，投入为零时百分比为零。
    /// 3. 汇总溢出返回 `InvalidPrice`，组合汇总保持原值。
    pub fn revalue(
        &mut self,
        prices: &HashMap<CoinId, Decimal>,
        now: DateTime<Utc>,
    ) -> Result<(), PortfolioError> {
        let mut total_value = Decimal::ZERO;
        let mut total_invested = Decimal::ZERO;
        for holding in &self.holdings {
            if let Some(&price) = prices.get(&holding.coin_id) {
                total_value = holding
                    .amount
                    .checked_mul(price)
                    .and_then(|v| total_value.checked_add(v))
                    .ok_or(PortfolioError::InvalidPrice(price))?;
                total_invested = total_invested
                    .checked_add(holding.total_invested)
                    .ok_or(PortfolioError::InvalidPrice(price))?;
            }
        }
        let total_profit = total_value
            .checked_sub(total_invested)
            .ok_or(PortfolioError::InvalidPrice(total_value))?;
        self.total_value = total_value;
        self.total_invested = total_invested;
        self.total_profit = total_profit;
        self.total_profit_percentage = percentage(total_profit, total_invested);
        self.last_updated = now;
        Ok(())
    }

    pub fn profit_status(&self) -> ProfitStatus {
        if self.total_profit > Decimal::ZERO {
            ProfitStatus::Profit
        } else if self.total_profit < Decimal::ZERO {
            ProfitStatus::Loss
        } else {
            ProfitStatus::Neutral
        }
    }
}

/// `part / whole * 100`，`whole` 为零时返回零
pub fn percentage(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(Decimal::ZERO)
}

/// # Summary
/// 组合展示设置的部分更新，`None` 表示保持原值。
#[derive(Debug, Clone, Default)]
pub struct PortfolioSettings {
    pub is_public: Option<bool>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl PortfolioSettings {
    pub fn apply(self, portfolio: &mut Portfolio) {
        if let Some(v) = self.is_public {
            portfolio.is_public = v;
        }
        if let Some(v) = self.description {
            portfolio.description = v;
        }
        if let Some(tags) = self.tags {
            portfolio.tags = tags.into_iter().map(|t| t.trim().to_string()).collect();
        }
    }
}

/// 公开组合列表的排序字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PortfolioSortField {
    #[default]
    TotalValue,
    TotalInvested,
    TotalProfit,
    TotalProfitPercentage,
    LastUpdated,
}

impl std::str::FromStr for PortfolioSortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "totalValue" => Ok(PortfolioSortField::TotalValue),
            "totalInvested" => Ok(PortfolioSortField::TotalInvested),
            "totalProfit" => Ok(PortfolioSortField::TotalProfit),
            "totalProfitPercentage" => Ok(PortfolioSortField::TotalProfitPercentage),
            "lastUpdated" => Ok(PortfolioSortField::LastUpdated),
            _ => Err(format!("Unknown sort field: {}", s)),
        }
    }
}
