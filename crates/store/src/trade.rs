use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tripcoin_core::account::entity::AccountId;
use tripcoin_core::catalog::entity::CoinId;
use tripcoin_core::common::{Page, PageRequest};
use tripcoin_core::store::error::StoreError;
use tripcoin_core::trade::entity::{OrderType, Trade, TradeFilter, TradeId, TradeStatus};
use tripcoin_core::trade::port::TradeStore;

use crate::db::{Database, db_err, parse_decimal, parse_enum, parse_opt_decimal};

const TRADE_COLUMNS: &str = "id, account_id, coin_id, symbol, side, amount, price, total_value, \
    fee, order_type, limit_price, stop_price, status, notes, executed_at, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct TradeRow {
    id: String,
    account_id: String,
    coin_id: String,
    symbol: String,
    side: String,
    amount: String,
    price: String,
    total_value: String,
    fee: String,
    order_type: String,
    limit_price: Option<String>,
    stop_price: Option<String>,
    status: String,
    notes: String,
    executed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TradeRow> for Trade {
    type Error = StoreError;

    fn try_from(row: TradeRow) -> Result<Self, Self::Error> {
        let order_type = OrderType::from_parts(
            &row.order_type,
            parse_opt_decimal("limit_price", row.limit_price.as_deref())?,
            parse_opt_decimal("stop_price", row.stop_price.as_deref())?,
        )
        .map_err(StoreError::Corrupted)?;
        Ok(Trade {
            id: TradeId(row.id),
            account_id: AccountId(row.account_id),
            coin_id: CoinId(row.coin_id),
            symbol: row.symbol,
            side: parse_enum(&row.side)?,
            amount: parse_decimal("amount", &row.amount)?,
            price: parse_decimal("price", &row.price)?,
            total_value: parse_decimal("total_value", &row.total_value)?,
            fee: parse_decimal("fee", &row.fee)?,
            order_type,
            status: parse_enum(&row.status)?,
            notes: row.notes,
            executed_at: row.executed_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub(crate) async fn load_trade(
    conn: &mut SqliteConnection,
    id: &TradeId,
) -> Result<Option<Trade>, StoreError> {
    let sql = format!("SELECT {} FROM trades WHERE id = ?", TRADE_COLUMNS);
    let row: Option<TradeRow> = sqlx::query_as(&sql)
        .bind(&id.0)
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_err)?;
    row.map(Trade::try_from).transpose()
}

/// # Summary
/// 将挂起订单标记为已成交。
///
/// # Returns
/// 仅当订单仍为 `Pending` 时更新并返回 `true`。
pub(crate) async fn mark_completed(
    conn: &mut SqliteConnection,
    id: &TradeId,
    now: DateTime<Utc>,
) -> Result<bool, StoreError> {
    let result = sqlx::query(
        "UPDATE trades SET status = ?, executed_at = ?, updated_at = ? WHERE id = ? AND status = ?",
    )
    .bind(TradeStatus::Completed.to_string())
    .bind(now)
    .bind(now)
    .bind(&id.0)
    .bind(TradeStatus::Pending.to_string())
    .execute(&mut *conn)
    .await
    .map_err(db_err)?;
    Ok(result.rows_affected() == 1)
}

fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, account_id: &AccountId, filter: &TradeFilter) {
    builder
        .push(" WHERE account_id = ")
        .push_bind(account_id.0.clone());
    if let Some(side) = filter.side {
        builder.push(" AND side = ").push_bind(side.to_string());
    }
    if let Some(status) = filter.status {
        builder.push(" AND status = ").push_bind(status.to_string());
    }
    if let Some(coin_id) = &filter.coin_id {
        builder.push(" AND coin_id = ").push_bind(coin_id.0.clone());
    }
}

/// # Summary
/// `TradeStore` 的 SQLite 实现。
pub struct SqliteTradeStore {
    pool: SqlitePool,
}

impl SqliteTradeStore {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }
}

#[async_trait]
impl TradeStore for SqliteTradeStore {
    async fn insert(&self, trade: &Trade) -> Result<(), StoreError> {
        let sql = format!(
            "INSERT INTO trades ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            TRADE_COLUMNS
        );
        sqlx::query(&sql)
            .bind(&trade.id.0)
            .bind(&trade.account_id.0)
            .bind(&trade.coin_id.0)
            .bind(&trade.symbol)
            .bind(trade.side.to_string())
            .bind(trade.amount.to_string())
            .bind(trade.price.to_string())
            .bind(trade.total_value.to_string())
            .bind(trade.fee.to_string())
            .bind(trade.order_type.kind())
            .bind(trade.order_type.limit_price().map(|v| v.to_string()))
            .bind(trade.order_type.stop_price().map(|v| v.to_string()))
            .bind(trade.status.to_string())
            .bind(&trade.notes)
            .bind(trade.executed_at)
            .bind(trade.created_at)
            .bind(trade.updated_at)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn get(&self, id: &TradeId) -> Result<Option<Trade>, StoreError> {
        let mut conn = self.pool.acquire().await.map_err(db_err)?;
        load_trade(&mut conn, id).await
    }

    async fn list(
        &self,
        account_id: &AccountId,
        filter: &TradeFilter,
        page: PageRequest,
    ) -> Result<Page<Trade>, StoreError> {
        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM trades");
        push_filters(&mut count, account_id, filter);
        let (total,): (i64,) = count
            .build_query_as()
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;

        let mut select = QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM trades", TRADE_COLUMNS));
        push_filters(&mut select, account_id, filter);
        select
            .push(" ORDER BY created_at DESC, rowid DESC LIMIT ")
            .push_bind(i64::from(page.limit))
            .push(" OFFSET ")
            .push_bind(i64::try_from(page.offset()).unwrap_or(i64::MAX));
        let rows: Vec<TradeRow> = select
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        let items = rows
            .into_iter()
            .map(Trade::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, page, u64::try_from(total).unwrap_or_default()))
    }

    async fn completed_since(
        &self,
        account_id: &AccountId,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Trade>, StoreError> {
        let mut select = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {} FROM trades WHERE account_id = ",
            TRADE_COLUMNS
        ));
        select
            .push_bind(account_id.0.clone())
            .push(" AND status = ")
            .push_bind(TradeStatus::Completed.to_string());
        if let Some(cutoff) = since {
            select.push(" AND created_at >= ").push_bind(cutoff);
        }
        select.push(" ORDER BY created_at");
        let rows: Vec<TradeRow> = select
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.into_iter().map(Trade::try_from).collect()
    }

    async fn cancel(&self, id: &TradeId, now: DateTime<Utc>) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE trades SET status = ?, updated_at = ? WHERE id = ? AND status = ?",
        )
        .bind(TradeStatus::Cancelled.to_string())
        .bind(now)
        .bind(&id.0)
        .bind(TradeStatus::Pending.to_string())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(result.rows_affected() == 1)
    }
}
