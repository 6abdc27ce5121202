#![allow(dead_code)]

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use tempfile::TempDir;
use tripcoin_core::account::entity::{Account, AccountId};
use tripcoin_core::account::port::AccountStore;
use tripcoin_core::catalog::entity::{Coin, CoinCategory, CoinUpdate, NewCoin};
use tripcoin_core::common::time::FakeClockProvider;
use tripcoin_trade::account::{AccountLedger, OpeningGrant};
use tripcoin_trade::catalog::CoinCatalog;
use tripcoin_trade::lock::AccountLocks;
use tripcoin_trade::portfolio::PortfolioService;
use tripcoin_trade::service::{TradeService, TradeStores};
use tripcoin_store::account::SqliteAccountStore;
use tripcoin_store::coin::SqliteCoinStore;
use tripcoin_store::db::Database;
use tripcoin_store::portfolio::SqlitePortfolioStore;
use tripcoin_store::settlement::SqliteSettlementStore;
use tripcoin_store::trade::SqliteTradeStore;

pub const FEE_RATE: Decimal = dec!(0.001);

/// 基于临时 SQLite 库组装的完整服务栈
pub struct Harness {
    _dir: TempDir,
    pub clock: Arc<FakeClockProvider>,
    pub accounts: Arc<SqliteAccountStore>,
    pub ledger: Arc<AccountLedger>,
    pub catalog: Arc<CoinCatalog>,
    pub portfolios: Arc<PortfolioService>,
    pub trades: Arc<TradeService>,
}

impl Harness {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db = Database::open(dir.path()).await.expect("Failed to open db");
        let clock = Arc::new(FakeClockProvider::new(Utc::now()));
        let locks = Arc::new(AccountLocks::new());

        let accounts = Arc::new(SqliteAccountStore::new(&db));
        let coins = Arc::new(SqliteCoinStore::new(&db));
        let portfolio_store = Arc::new(SqlitePortfolioStore::new(&db));

        let ledger = Arc::new(AccountLedger::new(
            accounts.clone(),
            locks.clone(),
            clock.clone(),
            OpeningGrant {
                balance: dec!(1000000),
                points: dec!(100),
            },
        ));
        let catalog = Arc::new(CoinCatalog::new(coins.clone(), clock.clone()));
        let portfolios = Arc::new(PortfolioService::new(
            portfolio_store.clone(),
            coins.clone(),
            accounts.clone(),
            locks.clone(),
            clock.clone(),
            FEE_RATE,
        ));
        let trades = Arc::new(TradeService::new(
            TradeStores {
                accounts: accounts.clone(),
                coins,
                portfolios: portfolio_store,
                trades: Arc::new(SqliteTradeStore::new(&db)),
                settlement: Arc::new(SqliteSettlementStore::new(&db)),
            },
            locks,
            clock.clone(),
            FEE_RATE,
        ));

        Self {
            _dir: dir,
            clock,
            accounts,
            ledger,
            catalog,
            portfolios,
            trades,
        }
    }

    /// 直接落库一个指定余额的账户
    pub async fn account_with_balance(&self, id: &str, balance: Decimal) -> AccountId {
        let account = Account::new(
            AccountId(id.to_string()),
            format!("user_{}", id),
            balance,
            dec!(100),
            Utc::now(),
        );
        self.accounts
            .insert(&account)
            .await
            .expect("Failed to insert account");
        account.id
    }

    pub async fn list_coin(&self, symbol: &str, price: Decimal) -> Coin {
        self.catalog
            .create(NewCoin {
                symbol: symbol.to_string(),
                name: format!("{} Coin", symbol),
                current_price: price,
                market_cap: dec!(1000),
                category: CoinCategory::Token,
                ..Default::default()
            })
            .await
            .expect("Failed to create coin")
    }

    pub async fn set_price(&self, coin: &Coin, price: Decimal) -> Coin {
        self.catalog
            .update(
                &coin.id,
                CoinUpdate {
                    current_price: Some(price),
                    ..Default::default()
                },
            )
            .await
            .expect("Failed to update price")
    }
}
