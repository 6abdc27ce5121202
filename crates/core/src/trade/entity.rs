use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::account::entity::AccountId;
use crate::catalog::entity::CoinId;

/// 单笔最小成交数量
pub const MIN_TRADE_AMOUNT: Decimal = dec!(0.000001);

/// # Summary
/// 订单的系统内唯一标识。
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct TradeId(pub String);

impl fmt::Display for TradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// # Summary
/// 订单的交易方向定义。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    /// 买入
    Buy,
    /// 卖出
    Sell,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "buy"),
            OrderSide::Sell => write!(f, "sell"),
        }
    }
}

impl FromStr for OrderSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buy" => Ok(OrderSide::Buy),
            "sell" => Ok(OrderSide::Sell),
            _ => Err(format!("Unknown order side: {}", s)),
        }
    }
}

/// # Summary
/// 委托类型。限价与止损单携带各自的触发价格。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    Market,
    Limit { limit_price: Decimal },
    Stop { stop_price: Decimal },
}

impl OrderType {
    pub fn kind(&self) -> &'static str {
        match self {
            OrderType::Market => "market",
            OrderType::Limit { .. } => "limit",
            OrderType::Stop { .. } => "stop",
        }
    }

    pub fn limit_price(&self) -> Option<Decimal> {
        match self {
            OrderType::Limit { limit_price } => Some(*limit_price),
            _ => None,
        }
    }

    pub fn stop_price(&self) -> Option<Decimal> {
        match self {
            OrderType::Stop { stop_price } => Some(*stop_price),
            _ => None,
        }
    }

    /// 由持久化的类型标签与价格列还原
    pub fn from_parts(
        kind: &str,
        limit_price: Option<Decimal>,
        stop_price: Option<Decimal>,
    ) -> Result<Self, String> {
        match (kind, limit_price, stop_price) {
            ("market", _, _) => Ok(OrderType::Market),
            ("limit", Some(limit_price), _) => Ok(OrderType::Limit { limit_price }),
            ("stop", _, Some(stop_price)) => Ok(OrderType::Stop { stop_price }),
            _ => Err(format!("Invalid order type: {}", kind)),
        }
    }
}

/// # Summary
/// 订单的生命周期状态。
///
/// # Invariants
/// - 只允许 `Pending` 迁移到其他状态。
/// - `Completed` 与 `Cancelled` 为终态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    Pending,
    Completed,
    Cancelled,
    Failed,
}

impl fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeStatus::Pending => write!(f, "pending"),
            TradeStatus::Completed => write!(f, "completed"),
            TradeStatus::Cancelled => write!(f, "cancelled"),
            TradeStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for TradeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TradeStatus::Pending),
            "completed" => Ok(TradeStatus::Completed),
            "cancelled" => Ok(TradeStatus::Cancelled),
            "failed" => Ok(TradeStatus::Failed),
            _ => Err(format!("Unknown trade status: {}", s)),
        }
    }
}

/// # Summary
/// 订单记录。
///
/// # Invariants
/// - `total_value = amount * price`，`fee = total_value * 手续费率`。
/// - `symbol` 在创建时从币种复制，之后不随币种变化。
/// - 进入 `Completed` 后不再修改。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: TradeId,
    pub account_id: AccountId,
    pub coin_id: CoinId,
    pub symbol: String,
    pub side: OrderSide,
    pub amount: Decimal,
    pub price: Decimal,
    pub total_value: Decimal,
    pub fee: Decimal,
    pub order_type: OrderType,
    pub status: TradeStatus,
    pub notes: String,
    pub executed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Trade {
    /// 买入时需要扣除的总金额，卖出时为到账金额；溢出时返回 `None`
    pub fn settlement_amount(&self) -> Option<Decimal> {
        match self.side {
            OrderSide::Buy => self.total_value.checked_add(self.fee),
            OrderSide::Sell => self.total_value.checked_sub(self.fee),
        }
    }
}

/// # Summary
/// 客户端提交的下单意图，在进入结算逻辑前完成校验。
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRequest {
    pub coin_id: CoinId,
    pub side: OrderSide,
    pub amount: Decimal,
    pub order_type: OrderType,
    pub notes: Option<String>,
}

impl TradeRequest {
    /// # Logic
    /// 1. 数量不得低于 `MIN_TRADE_AMOUNT`。
    /// 2. 限价与止损价格必须为正。
    pub fn validate(&self) -> Result<(), String> {
        if self.coin_id.0.trim().is_empty() {
            return Err("coinId is required".to_string());
        }
        if self.amount < MIN_TRADE_AMOUNT {
            return Err(format!("amount must be at least {}", MIN_TRADE_AMOUNT));
        }
        match self.order_type {
            OrderType::Limit { limit_price } if limit_price <= Decimal::ZERO => {
                Err("limitPrice must be positive".to_string())
            }
            OrderType::Stop { stop_price } if stop_price <= Decimal::ZERO => {
                Err("stopPrice must be positive".to_string())
            }
            _ => Ok(()),
        }
    }
}

/// 订单列表筛选条件
#[derive(Debug, Clone, Default)]
pub struct TradeFilter {
    pub side: Option<OrderSide>,
    pub status: Option<TradeStatus>,
    pub coin_id: Option<CoinId>,
}

/// # Summary
/// 交易统计窗口。无法识别的取值视为全部。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatsPeriod {
    #[serde(rename = "all")]
    All,
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "7d")]
    SevenDays,
    #[serde(rename = "30d")]
    ThirtyDays,
}

impl StatsPeriod {
    pub fn parse(s: &str) -> Self {
        match s {
            "1d" => StatsPeriod::OneDay,
            "7d" => StatsPeriod::SevenDays,
            "30d" => StatsPeriod::ThirtyDays,
            _ => StatsPeriod::All,
        }
    }

    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            StatsPeriod::All => None,
            StatsPeriod::OneDay => Some(now - Duration::days(1)),
            StatsPeriod::SevenDays => Some(now - Duration::days(7)),
            StatsPeriod::ThirtyDays => Some(now - Duration::days(30)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatsPeriod::All => "all",
            StatsPeriod::OneDay => "1d",
            StatsPeriod::SevenDays => "7d",
            StatsPeriod::ThirtyDays => "30d",
        }
    }
}

/// 单个方向的成交汇总
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SideStats {
    pub count: u64,
    pub total_amount: Decimal,
    pub total_value: Decimal,
    pub total_fee: Decimal,
}

impl SideStats {
    fn add(&mut self, trade: &Trade) {
        self.count += 1;
        self.total_amount = self.total_amount.saturating_add(trade.amount);
        self.total_value = self.total_value.saturating_add(trade.total_value);
        self.total_fee = self.total_fee.saturating_add(trade.fee);
    }
}

/// 买卖合计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TotalStats {
    pub count: u64,
    pub total_value: Decimal,
    pub total_fee: Decimal,
}

/// # Summary
/// 某一时间窗口内已成交订单的统计。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeStats {
    pub period: StatsPeriod,
    pub buy: SideStats,
    pub sell: SideStats,
    pub total: TotalStats,
}

impl TradeStats {
    /// # Logic
    /// 只统计 `Completed` 订单，按方向分组累加，再汇总合计。
    pub fn from_trades<'a>(period: StatsPeriod, trades: impl IntoIterator<Item = &'a Trade>) -> Self {
        let mut buy = SideStats::default();
        let mut sell = SideStats::default();
        for trade in trades {
            if trade.status != TradeStatus::Completed {
                continue;
            }
            match trade.side {
                OrderSide::Buy => buy.add(trade),
                OrderSide::Sell => sell.add(trade),
            }
        }
        Self {
            period,
            buy,
            sell,
            total: TotalStats {
                count: buy.count + sell.count,
                total_value: buy.total_value.saturating_add(sell.total_value),
                total_fee: buy.total_fee.saturating_add(sell.total_fee),
            },
        }
    }
}
