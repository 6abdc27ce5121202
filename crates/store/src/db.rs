use rust_decimal::Decimal;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous},
};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;
use tripcoin_core::store::error::StoreError;

/// 默认数据库文件名
const DEFAULT_DB_FILE: &str = "app.db";

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    username TEXT NOT NULL,
    email TEXT,
    google_id TEXT UNIQUE,
    wallet_address TEXT UNIQUE,
    balance TEXT NOT NULL,
    point TEXT NOT NULL,
    svt_point TEXT NOT NULL,
    monthly_earned TEXT NOT NULL,
    monthly_used TEXT NOT NULL,
    total_exchanged TEXT NOT NULL,
    rank TEXT NOT NULL,
    sns_share INTEGER NOT NULL DEFAULT 0,
    survey INTEGER NOT NULL DEFAULT 0,
    daily_quiz INTEGER NOT NULL DEFAULT 0,
    mini_game INTEGER NOT NULL DEFAULT 0,
    role TEXT NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1,
    last_login DATETIME NOT NULL,
    created_at DATETIME NOT NULL,
    updated_at DATETIME NOT NULL
);

CREATE TABLE IF NOT EXISTS coins (
    id TEXT PRIMARY KEY,
    symbol TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    current_price TEXT NOT NULL,
    market_cap TEXT NOT NULL,
    volume_24h TEXT NOT NULL,
    price_change_24h TEXT NOT NULL,
    price_change_percentage_24h TEXT NOT NULL,
    high_24h TEXT NOT NULL,
    low_24h TEXT NOT NULL,
    circulating_supply TEXT NOT NULL,
    total_supply TEXT NOT NULL,
    max_supply TEXT,
    image TEXT,
    description TEXT NOT NULL DEFAULT '',
    website TEXT,
    whitepaper TEXT,
    is_active INTEGER NOT NULL DEFAULT 1,
    category TEXT NOT NULL,
    created_at DATETIME NOT NULL,
    updated_at DATETIME NOT NULL
);

CREATE TABLE IF NOT EXISTS price_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    coin_id TEXT NOT NULL,
    price TEXT NOT NULL,
    timestamp DATETIME NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_price_history_coin ON price_history (coin_id, timestamp);

CREATE TABLE IF NOT EXISTS portfolios (
    account_id TEXT PRIMARY KEY,
    total_value TEXT NOT NULL,
    total_invested TEXT NOT NULL,
    total_profit TEXT NOT NULL,
    total_profit_percentage TEXT NOT NULL,
    last_updated DATETIME NOT NULL,
    is_public INTEGER NOT NULL DEFAULT 0,
    description TEXT NOT NULL DEFAULT '',
    tags TEXT NOT NULL DEFAULT '[]',
    created_at DATETIME NOT NULL
);

CREATE TABLE IF NOT EXISTS holdings (
    account_id TEXT NOT NULL,
    coin_id TEXT NOT NULL,
    symbol TEXT NOT NULL,
    amount TEXT NOT NULL,
    average_buy_price TEXT NOT NULL,
    total_invested TEXT NOT NULL,
    last_updated DATETIME NOT NULL,
    position INTEGER NOT NULL,
    PRIMARY KEY (account_id, coin_id)
);

CREATE TABLE IF NOT EXISTS trades (
    id TEXT PRIMARY KEY,
    account_id TEXT NOT NULL,
    coin_id TEXT NOT NULL,
    symbol TEXT NOT NULL,
    side TEXT NOT NULL,
    amount TEXT NOT NULL,
    price TEXT NOT NULL,
    total_value TEXT NOT NULL,
    fee TEXT NOT NULL,
    order_type TEXT NOT NULL,
    limit_price TEXT,
    stop_price TEXT,
    status TEXT NOT NULL,
    notes TEXT NOT NULL DEFAULT '',
    executed_at DATETIME,
    created_at DATETIME NOT NULL,
    updated_at DATETIME NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_trades_account ON trades (account_id, created_at);
"#;

/// # Summary
/// 应用数据库句柄，所有存储适配器共享同一个连接池。
///
/// # Invariants
/// - 连接池只保留一个连接，写事务之间天然串行，避免 SQLite 的锁升级死锁。
/// - 表结构在打开时初始化。
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// # Summary
    /// 在数据目录下打开 (或创建) `app.db`。
    ///
    /// # Logic
    /// 1. 确保数据目录存在。
    /// 2. 以 WAL 模式连接数据库。
    /// 3. 执行 DDL 初始化全部表结构。
    pub async fn open(data_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let data_dir = data_dir.as_ref();
        std::fs::create_dir_all(data_dir)
            .map_err(|e| StoreError::InitError(format!("Failed to create data dir: {}", e)))?;
        let db_path = data_dir.join(DEFAULT_DB_FILE);

        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(10));

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::InitError(e.to_string()))?;

        sqlx::raw_sql(SCHEMA)
            .execute(&pool)
            .await
            .map_err(|e| StoreError::InitError(e.to_string()))?;

        info!("Database opened at {}", db_path.display());
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// 将 sqlx 错误映射为存储错误，唯一约束冲突单独区分
pub(crate) fn db_err(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &e
        && db.is_unique_violation()
    {
        return StoreError::Conflict(db.message().to_string());
    }
    StoreError::Database(e.to_string())
}

/// 解析以 TEXT 存储的十进制数
pub(crate) fn parse_decimal(field: &str, raw: &str) -> Result<Decimal, StoreError> {
    Decimal::from_str(raw)
        .map_err(|e| StoreError::Corrupted(format!("{} = {:?}: {}", field, raw, e)))
}

pub(crate) fn parse_opt_decimal(field: &str, raw: Option<&str>) -> Result<Option<Decimal>, StoreError> {
    raw.map(|r| parse_decimal(field, r)).transpose()
}

/// 解析以 TEXT 存储的枚举
pub(crate) fn parse_enum<T: FromStr<Err = String>>(raw: &str) -> Result<T, StoreError> {
    T::from_str(raw).map_err(StoreError::Corrupted)
}

/// 构造大小写不敏感的 LIKE 子串模式，转义通配符
pub(crate) fn like_pattern(query: &str) -> String {
    let escaped = query
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}
