use rust_decimal::Decimal;
use tripcoin_core::trade::entity::OrderType;

/// # Summary
/// 一笔订单的计价结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    pub price: Decimal,
    /// 成交额 = 数量 * 价格
    pub total_value: Decimal,
    /// 单边手续费 = 成交额 * 费率
    pub fee: Decimal,
    /// 买入需要的总资金 = 成交额 + 手续费
    pub total_with_fee: Decimal,
}

impl Quote {
    /// # Logic
    /// 计算成交额、手续费与买入总资金，任一步溢出时返回 `None`。
    pub fn compute(amount: Decimal, price: Decimal, fee_rate: Decimal) -> Option<Self> {
        let total_value = amount.checked_mul(price)?;
        let fee = total_value.checked_mul(fee_rate)?;
        let total_with_fee = total_value.checked_add(fee)?;
        Some(Self {
            price,
            total_value,
            fee,
            total_with_fee,
        })
    }
}

/// # Summary
/// 订单计价的成交价: 限价单取限价，市价与止损单取币种现价。
pub fn effective_price(order_type: &OrderType, current_price: Decimal) -> Decimal {
    match order_type {
        OrderType::Limit { limit_price } => *limit_price,
        OrderType::Market | OrderType::Stop { .. } => current_price,
    }
}
