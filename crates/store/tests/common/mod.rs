#![allow(dead_code)]

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tempfile::TempDir;
use tripcoin_core::account::entity::{Account, AccountId};
use tripcoin_core::catalog::entity::{Coin, CoinCategory, CoinId};
use tripcoin_core::trade::entity::{OrderSide, OrderType, Trade, TradeId, TradeStatus};
use tripcoin_store::db::Database;

pub async fn open_db() -> (TempDir, Database) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db = Database::open(dir.path()).await.expect("Failed to open db");
    (dir, db)
}

pub fn account(id: &str, balance: Decimal) -> Account {
    Account::new(
        AccountId(id.to_string()),
        format!("user_{}", id),
        balance,
        Decimal::ONE_HUNDRED,
        Utc::now(),
    )
}

pub fn coin(id: &str, symbol: &str, price: Decimal, market_cap: Decimal) -> Coin {
    let now = Utc::now();
    Coin {
        id: CoinId(id.to_string()),
        symbol: symbol.to_string(),
        name: format!("{} Coin", symbol),
        current_price: price,
        market_cap,
        volume_24h: Decimal::ZERO,
        price_change_24h: Decimal::ZERO,
        price_change_percentage_24h: Decimal::ZERO,
        high_24h: price,
        low_24h: price,
        circulating_supply: Decimal::ZERO,
        total_supply: Decimal::ZERO,
        max_supply: None,
        image: None,
        description: String::new(),
        website: None,
        whitepaper: None,
        is_active: true,
        category: CoinCategory::Cryptocurrency,
        created_at: now,
        updated_at: now,
    }
}

pub fn pending_trade(
    account: &Account,
    coin: &Coin,
    side: OrderSide,
    amount: Decimal,
    created_at: DateTime<Utc>,
) -> Trade {
    let total_value = amount * coin.current_price;
    Trade {
        id: TradeId(uuid::Uuid::new_v4().to_string()),
        account_id: account.id.clone(),
        coin_id: coin.id.clone(),
        symbol: coin.symbol.clone(),
        side,
        amount,
        price: coin.current_price,
        total_value,
        fee: total_value * Decimal::new(1, 3),
        order_type: OrderType::Market,
        status: TradeStatus::Pending,
        notes: String::new(),
        executed_at: None,
        created_at,
        updated_at: created_at,
    }
}
