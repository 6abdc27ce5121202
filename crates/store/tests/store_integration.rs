mod common;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tripcoin_core::account::entity::{AccountId, PointKind, Rank};
use tripcoin_core::account::port::AccountStore;
use tripcoin_core::catalog::entity::{
    CoinCategory, CoinId, CoinQuery, CoinSortField, PricePoint, TrendingKind,
};
use tripcoin_core::catalog::port::CoinStore;
use tripcoin_core::common::{PageRequest, SortOrder};
use tripcoin_core::portfolio::entity::{Portfolio, PortfolioSortField};
use tripcoin_core::portfolio::port::PortfolioStore;
use tripcoin_core::store::error::StoreError;
use tripcoin_core::trade::entity::{OrderSide, OrderType, TradeFilter, TradeStatus};
use tripcoin_core::trade::port::TradeStore;
use tripcoin_store::account::SqliteAccountStore;
use tripcoin_store::coin::SqliteCoinStore;
use tripcoin_store::portfolio::SqlitePortfolioStore;
use tripcoin_store::trade::SqliteTradeStore;

#[tokio::test]
async fn test_account_round_trip_and_unique_wallet() {
    let (_dir, db) = common::open_db().await;
    let store = SqliteAccountStore::new(&db);

    let mut acct = common::account("a1", dec!(1000));
    acct.wallet_address = Some("0xabc".into());
    store.insert(&acct).await.unwrap();

    acct.credit_points(dec!(450), PointKind::Point).unwrap();
    acct.one_time_missions.survey = true;
    store.save(&acct).await.unwrap();

    let loaded = store.get(&acct.id).await.unwrap().expect("account should exist");
    assert_eq!(loaded, acct);
    assert_eq!(loaded.rank, Rank::Silver);

    let by_wallet = store.find_by_wallet("0xabc").await.unwrap().unwrap();
    assert_eq!(by_wallet.id, acct.id);

    let mut dup = common::account("a2", dec!(1));
    dup.wallet_address = Some("0xabc".into());
    let err = store.insert(&dup).await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));

    let missing = common::account("ghost", dec!(1));
    assert!(matches!(store.save(&missing).await, Err(StoreError::NotFound)));
}

#[tokio::test]
async fn test_rankings_order_by_point_then_svt() {
    let (_dir, db) = common::open_db().await;
    let store = SqliteAccountStore::new(&db);

    let mut a = common::account("a", Decimal::ZERO);
    a.point = dec!(900);
    let mut b = common::account("b", Decimal::ZERO);
    b.point = dec!(900);
    b.svt_point = dec!(5);
    let mut c = common::account("c", Decimal::ZERO);
    c.point = dec!(1200);
    let mut inactive = common::account("d", Decimal::ZERO);
    inactive.point = dec!(99999);
    inactive.is_active = false;
    for acct in [&a, &b, &c, &inactive] {
        store.insert(acct).await.unwrap();
    }

    let ranked: Vec<String> = store
        .rankings(10)
        .await
        .unwrap()
        .into_iter()
        .map(|acct| acct.id.0)
        .collect();
    assert_eq!(ranked, vec!["c", "b", "a"]);

    let ids = store.list_ids().await.unwrap();
    assert_eq!(ids.len(), 4);
    assert!(ids.contains(&AccountId("d".into())));
}

#[tokio::test]
async fn test_coin_queries() {
    let (_dir, db) = common::open_db().await;
    let store = SqliteCoinStore::new(&db);

    let mut btc = common::coin("btc", "BTC", dec!(100), dec!(5000));
    btc.price_change_percentage_24h = dec!(3.5);
    let mut eth = common::coin("eth", "ETH", dec!(10), dec!(900));
    eth.price_change_percentage_24h = dec!(-2);
    eth.category = CoinCategory::Defi;
    let mut dead = common::coin("dead", "DEAD", dec!(1), dec!(999999));
    dead.is_active = false;
    for coin in [&btc, &eth, &dead] {
        store.insert(coin).await.unwrap();
    }

    let dup = common::coin("btc2", "BTC", dec!(1), dec!(1));
    assert!(matches!(store.insert(&dup).await, Err(StoreError::Conflict(_))));

    let found = store.find_by_symbol(" btc").await.unwrap().unwrap();
    assert_eq!(found.id, btc.id);
    assert!(store.find_by_symbol("DEAD").await.unwrap().is_none());
    assert!(store.get(&dead.id).await.unwrap().is_some());

    let page = store
        .list(&CoinQuery::default(), PageRequest::new(Some(1), Some(1)))
        .await
        .unwrap();
    assert_eq!(page.pagination.total_items, 2);
    assert_eq!(page.pagination.total_pages, 2);
    assert_eq!(page.items[0].symbol, "BTC");

    let query = CoinQuery {
        sort: CoinSortField::CurrentPrice,
        order: SortOrder::Asc,
        search: Some("coin".into()),
        category: None,
    };
    let asc = store.list(&query, PageRequest::default()).await.unwrap();
    let symbols: Vec<_> = asc.items.iter().map(|c| c.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["ETH", "BTC"]);

    let defi = CoinQuery {
        category: Some(CoinCategory::Defi),
        ..Default::default()
    };
    assert_eq!(store.list(&defi, PageRequest::default()).await.unwrap().items.len(), 1);

    let popular = store.popular(1).await.unwrap();
    assert_eq!(popular[0].symbol, "BTC");
    let losers = store.trending(TrendingKind::Losers, 10).await.unwrap();
    assert_eq!(losers[0].symbol, "ETH");
    let hits = store.search("et", 10).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert!(store.search("%", 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_price_history_and_snapshot_prices() {
    let (_dir, db) = common::open_db().await;
    let store = SqliteCoinStore::new(&db);

    let mut btc = common::coin("btc", "BTC", dec!(100), dec!(1));
    store.insert(&btc).await.unwrap();

    let later = btc.created_at + Duration::minutes(5);
    btc.current_price = dec!(110);
    store
        .save(
            &btc,
            Some(PricePoint {
                price: dec!(110),
                timestamp: later,
            }),
        )
        .await
        .unwrap();

    let history = store.price_history(&btc.id, None).await.unwrap();
    let prices: Vec<_> = history.iter().map(|p| p.price).collect();
    assert_eq!(prices, vec![dec!(100), dec!(110)]);

    let recent = store
        .price_history(&btc.id, Some(later - Duration::seconds(1)))
        .await
        .unwrap();
    assert_eq!(recent.len(), 1);

    let snapshot = store
        .get_many(&[btc.id.clone(), CoinId("missing".into())])
        .await
        .unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[&btc.id].current_price, dec!(110));
    assert_eq!(snapshot[&btc.id].symbol, btc.symbol);
    assert!(store.get_many(&[]).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_portfolio_keeps_holding_order_and_settings() {
    let (_dir, db) = common::open_db().await;
    let store = SqlitePortfolioStore::new(&db);
    let now = Utc::now();

    let mut p = Portfolio::new(AccountId("a1".into()), now);
    p.apply_buy(&CoinId("zzz".into()), "ZZZ", dec!(1), dec!(2), now).unwrap();
    p.apply_buy(&CoinId("aaa".into()), "AAA", dec!(3), dec!(4), now).unwrap();
    p.is_public = true;
    p.tags = vec!["hodl".into()];
    p.total_value = dec!(14);
    store.save(&p).await.unwrap();

    let loaded = store.get(&p.account_id).await.unwrap().unwrap();
    assert_eq!(loaded, p);

    p.apply_sell(&CoinId("zzz".into()), dec!(1), now).unwrap();
    store.save(&p).await.unwrap();
    let loaded = store.get(&p.account_id).await.unwrap().unwrap();
    assert_eq!(loaded.holdings.len(), 1);
    assert_eq!(loaded.holdings[0].symbol, "AAA");

    let mut other = Portfolio::new(AccountId("a2".into()), now);
    other.is_public = true;
    other.total_value = dec!(100);
    store.save(&other).await.unwrap();
    let private = Portfolio::new(AccountId("a3".into()), now);
    store.save(&private).await.unwrap();

    let page = store
        .list_public(PortfolioSortField::TotalValue, SortOrder::Desc, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.pagination.total_items, 2);
    assert_eq!(page.items[0].account_id, AccountId("a2".into()));
    assert_eq!(page.items[1].holdings.len(), 1);
}

#[tokio::test]
async fn test_trade_listing_and_conditional_cancel() {
    let (_dir, db) = common::open_db().await;
    let store = SqliteTradeStore::new(&db);
    let acct = common::account("a1", dec!(1000));
    let btc = common::coin("btc", "BTC", dec!(10), dec!(1));
    let t0 = Utc::now();

    let first = common::pending_trade(&acct, &btc, OrderSide::Buy, dec!(1), t0);
    let mut second = common::pending_trade(&acct, &btc, OrderSide::Sell, dec!(2), t0 + Duration::seconds(1));
    second.order_type = OrderType::Limit {
        limit_price: dec!(9),
    };
    store.insert(&first).await.unwrap();
    store.insert(&second).await.unwrap();

    let loaded = store.get(&second.id).await.unwrap().unwrap();
    assert_eq!(loaded, second);

    let all = store
        .list(&acct.id, &TradeFilter::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(all.items[0].id, second.id);
    assert_eq!(all.pagination.total_items, 2);

    let sells = TradeFilter {
        side: Some(OrderSide::Sell),
        ..Default::default()
    };
    assert_eq!(
        store.list(&acct.id, &sells, PageRequest::default()).await.unwrap().items.len(),
        1
    );

    assert!(store.cancel(&first.id, Utc::now()).await.unwrap());
    assert!(!store.cancel(&first.id, Utc::now()).await.unwrap());
    let cancelled = store.get(&first.id).await.unwrap().unwrap();
    assert_eq!(cancelled.status, TradeStatus::Cancelled);

    let done = store.completed_since(&acct.id, None).await.unwrap();
    assert!(done.is_empty());
}
