mod common;

use chrono::Utc;
use rust_decimal_macros::dec;
use tripcoin_core::account::port::AccountStore;
use tripcoin_core::catalog::port::CoinStore;
use tripcoin_core::portfolio::port::PortfolioStore;
use tripcoin_core::trade::entity::{OrderSide, TradeStatus};
use tripcoin_core::trade::port::{SettlementStore, TradeError, TradeStore};
use tripcoin_store::account::SqliteAccountStore;
use tripcoin_store::coin::SqliteCoinStore;
use tripcoin_store::portfolio::SqlitePortfolioStore;
use tripcoin_store::settlement::SqliteSettlementStore;
use tripcoin_store::trade::SqliteTradeStore;

#[tokio::test]
async fn test_buy_settlement_updates_all_three_records() -> anyhow::Result<()> {
    let (_dir, db) = common::open_db().await;
    let accounts = SqliteAccountStore::new(&db);
    let coins = SqliteCoinStore::new(&db);
    let trades = SqliteTradeStore::new(&db);
    let portfolios = SqlitePortfolioStore::new(&db);
    let settlement = SqliteSettlementStore::new(&db);

    let acct = common::account("a1", dec!(1000));
    let btc = common::coin("btc", "BTC", dec!(10), dec!(1));
    accounts.insert(&acct).await?;
    coins.insert(&btc).await?;

    let trade = common::pending_trade(&acct, &btc, OrderSide::Buy, dec!(50), Utc::now());
    trades.insert(&trade).await?;

    let outcome = settlement.settle(&trade.id, Utc::now()).await?;
    assert_eq!(outcome.account.balance, dec!(499.5));
    assert_eq!(outcome.trade.status, TradeStatus::Completed);
    assert!(outcome.trade.executed_at.is_some());

    let stored_acct = accounts.get(&acct.id).await?.unwrap();
    assert_eq!(stored_acct.balance, dec!(499.5));

    let portfolio = portfolios.get(&acct.id).await?.unwrap();
    let holding = portfolio.holding(&btc.id).unwrap();
    assert_eq!(holding.amount, dec!(50));
    assert_eq!(holding.average_buy_price, dec!(10));
    assert_eq!(holding.total_invested, dec!(500));
    assert_eq!(portfolio.total_value, dec!(500));

    let stored_trade = trades.get(&trade.id).await?.unwrap();
    assert_eq!(stored_trade.status, TradeStatus::Completed);

    let again = settlement.settle(&trade.id, Utc::now()).await;
    assert!(matches!(again, Err(TradeError::InvalidState(_))));
    Ok(())
}

#[tokio::test]
async fn test_failed_settlement_rolls_back() -> anyhow::Result<()> {
    let (_dir, db) = common::open_db().await;
    let accounts = SqliteAccountStore::new(&db);
    let coins = SqliteCoinStore::new(&db);
    let trades = SqliteTradeStore::new(&db);
    let portfolios = SqlitePortfolioStore::new(&db);
    let settlement = SqliteSettlementStore::new(&db);

    let acct = common::account("a1", dec!(100));
    let btc = common::coin("btc", "BTC", dec!(10), dec!(1));
    accounts.insert(&acct).await?;
    coins.insert(&btc).await?;

    // 100 < 500.5
    let buy = common::pending_trade(&acct, &btc, OrderSide::Buy, dec!(50), Utc::now());
    trades.insert(&buy).await?;
    let err = settlement.settle(&buy.id, Utc::now()).await.unwrap_err();
    assert!(matches!(err, TradeError::InsufficientFunds { .. }));

    let sell = common::pending_trade(&acct, &btc, OrderSide::Sell, dec!(1), Utc::now());
    trades.insert(&sell).await?;
    let err = settlement.settle(&sell.id, Utc::now()).await.unwrap_err();
    assert!(matches!(err, TradeError::InsufficientHoldings { .. }));

    assert_eq!(accounts.get(&acct.id).await?.unwrap().balance, dec!(100));
    assert!(portfolios.get(&acct.id).await?.is_none());
    assert_eq!(trades.get(&buy.id).await?.unwrap().status, TradeStatus::Pending);
    assert_eq!(trades.get(&sell.id).await?.unwrap().status, TradeStatus::Pending);
    Ok(())
}

#[tokio::test]
async fn test_sell_settlement_preserves_cost_basis() -> anyhow::Result<()> {
    let (_dir, db) = common::open_db().await;
    let accounts = SqliteAccountStore::new(&db);
    let coins = SqliteCoinStore::new(&db);
    let trades = SqliteTradeStore::new(&db);
    let settlement = SqliteSettlementStore::new(&db);

    let acct = common::account("a1", dec!(1000));
    let mut btc = common::coin("btc", "BTC", dec!(10), dec!(1));
    accounts.insert(&acct).await?;
    coins.insert(&btc).await?;

    let buy = common::pending_trade(&acct, &btc, OrderSide::Buy, dec!(50), Utc::now());
    trades.insert(&buy).await?;
    settlement.settle(&buy.id, Utc::now()).await?;

    btc.current_price = dec!(12);
    coins.save(&btc, None).await?;
    let sell = common::pending_trade(&acct, &btc, OrderSide::Sell, dec!(20), Utc::now());
    trades.insert(&sell).await?;
    let outcome = settlement.settle(&sell.id, Utc::now()).await?;

    assert_eq!(outcome.account.balance, dec!(739.26));
    let holding = outcome.portfolio.holding(&btc.id).unwrap();
    assert_eq!(holding.amount, dec!(30));
    assert_eq!(holding.average_buy_price, dec!(10));
    assert_eq!(holding.total_invested, dec!(300));
    assert_eq!(outcome.portfolio.total_value, dec!(360));
    assert_eq!(outcome.portfolio.total_profit, dec!(60));
    Ok(())
}
