//! 持仓账本的性质测试：
//! 1. 任意买入序列后的均价等于成交量加权均价
//! 2. 超量卖出被拒绝且持仓不变
//! 3. 部分卖出不改变均价

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use tripcoin_core::account::entity::AccountId;
use tripcoin_core::catalog::entity::CoinId;
use tripcoin_core::portfolio::entity::{Portfolio, PortfolioError};

/// (数量, 价格)，均为两位小数
fn buy_strategy() -> impl Strategy<Value = (Decimal, Decimal)> {
    (1i64..1_000_000, 1i64..10_000_000)
        .prop_map(|(amount, price)| (Decimal::new(amount, 2), Decimal::new(price, 2)))
}

fn coin() -> CoinId {
    CoinId("coin-1".into())
}

proptest! {
    #[test]
    fn average_price_is_volume_weighted(buys in prop::collection::vec(buy_strategy(), 1..20)) {
        let mut portfolio = Portfolio::new(AccountId("a".into()), Utc::now());
        let mut cost = Decimal::ZERO;
        let mut amount = Decimal::ZERO;
        for (a, p) in &buys {
            portfolio.apply_buy(&coin(), "C", *a, *p, Utc::now()).unwrap();
            cost += *a * *p;
            amount += *a;
        }
        let holding = portfolio.holding(&coin()).unwrap();
        let expected = cost / amount;
        prop_assert!((holding.average_buy_price - expected).abs() <= dec!(0.000000001));
        prop_assert_eq!(holding.amount, amount);
        prop_assert_eq!(holding.total_invested, cost);
    }

    #[test]
    fn oversell_is_rejected_without_change((a, p) in buy_strategy(), extra in 1i64..1000) {
        let mut portfolio = Portfolio::new(AccountId("a".into()), Utc::now());
        portfolio.apply_buy(&coin(), "C", a, p, Utc::now()).unwrap();
        let before = portfolio.clone();

        let result = portfolio.apply_sell(&coin(), a + Decimal::new(extra, 4), Utc::now());
        let is_insufficient = matches!(result, Err(PortfolioError::InsufficientHoldings { .. }));
        prop_assert!(is_insufficient);
        prop_assert_eq!(portfolio, before);
    }

    #[test]
    fn partial_sell_keeps_average_price((a, p) in buy_strategy(), pct in 1u32..100) {
        let mut portfolio = Portfolio::new(AccountId("a".into()), Utc::now());
        portfolio.apply_buy(&coin(), "C", a, p, Utc::now()).unwrap();
        let sell = (a * Decimal::from(pct) / Decimal::ONE_HUNDRED).round_dp(6);
        prop_assume!(sell > Decimal::ZERO && sell < a);

        portfolio.apply_sell(&coin(), sell, Utc::now()).unwrap();
        let holding = portfolio.holding(&coin()).unwrap();
        prop_assert_eq!(holding.average_buy_price, p);
        prop_assert_eq!(holding.amount, a - sell);
        prop_assert_eq!(holding.total_invested, p * (a - sell));
    }
}
