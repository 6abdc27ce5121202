use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tripcoin_core::account::entity::AccountId;
use tripcoin_core::catalog::entity::CoinId;
use tripcoin_core::common::{Page, PageRequest, SortOrder};
use tripcoin_core::portfolio::entity::{Holding, Portfolio, PortfolioSortField};
use tripcoin_core::portfolio::port::PortfolioStore;
use tripcoin_core::store::error::StoreError;

use crate::db::{Database, db_err, parse_decimal};

const PORTFOLIO_COLUMNS: &str = "account_id, total_value, total_invested, total_profit, \
    total_profit_percentage, last_updated, is_public, description, tags, created_at";

#[derive(sqlx::FromRow)]
struct PortfolioRow {
    account_id: String,
    total_value: String,
    total_invested: String,
    total_profit: String,
    total_profit_percentage: String,
    last_updated: DateTime<Utc>,
    is_public: bool,
    description: String,
    tags: String,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct HoldingRow {
    coin_id: String,
    symbol: String,
    amount: String,
    average_buy_price: String,
    total_invested: String,
    last_updated: DateTime<Utc>,
}

impl TryFrom<HoldingRow> for Holding {
    type Error = StoreError;

    fn try_from(row: HoldingRow) -> Result<Self, Self::Error> {
        Ok(Holding {
            coin_id: CoinId(row.coin_id),
            symbol: row.symbol,
            amount: parse_decimal("amount", &row.amount)?,
            average_buy_price: parse_decimal("average_buy_price", &row.average_buy_price)?,
            total_invested: parse_decimal("total_invested", &row.total_invested)?,
            last_updated: row.last_updated,
        })
    }
}

fn into_portfolio(row: PortfolioRow, holdings: Vec<Holding>) -> Result<Portfolio, StoreError> {
    let tags: Vec<String> = serde_json::from_str(&row.tags)
        .map_err(|e| StoreError::Corrupted(format!("tags: {}", e)))?;
    Ok(Portfolio {
        account_id: AccountId(row.account_id),
        holdings,
        total_value: parse_decimal("total_value", &row.total_value)?,
        total_invested: parse_decimal("total_invested", &row.total_invested)?,
        total_profit: parse_decimal("total_profit", &row.total_profit)?,
        total_profit_percentage: parse_decimal(
            "total_profit_percentage",
            &row.total_profit_percentage,
        )?,
        last_updated: row.last_updated,
        is_public: row.is_public,
        description: row.description,
        tags,
        created_at: row.created_at,
    })
}

async fn load_holdings(
    conn: &mut SqliteConnection,
    account_id: &str,
) -> Result<Vec<Holding>, StoreError> {
    let rows: Vec<HoldingRow> = sqlx::query_as(
        "SELECT coin_id, symbol, amount, average_buy_price, total_invested, last_updated \
         FROM holdings WHERE account_id = ? ORDER BY position",
    )
    .bind(account_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(db_err)?;
    rows.into_iter().map(Holding::try_from).collect()
}

/// 读取组合及其持仓，供连接池与事务共用
pub(crate) async fn load_portfolio(
    conn: &mut SqliteConnection,
    account_id: &AccountId,
) -> Result<Option<Portfolio>, StoreError> {
    let sql = format!(
        "SELECT {} FROM portfolios WHERE account_id = ?",
        PORTFOLIO_COLUMNS
    );
    let row: Option<PortfolioRow> = sqlx::query_as(&sql)
        .bind(&account_id.0)
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_err)?;
    let Some(row) = row else {
        return Ok(None);
    };
    let holdings = load_holdings(conn, &account_id.0).await?;
    into_portfolio(row, holdings).map(Some)
}

/// # Summary
/// 写入组合。
///
/// # Logic
/// 1. UPSERT 组合汇总行。
/// 2. 删除旧持仓后按当前顺序重新插入，`position` 记录插入顺序。
///
/// 调用方负责把两步放在同一事务里。
pub(crate) async fn write_portfolio(
    conn: &mut SqliteConnection,
    portfolio: &Portfolio,
) -> Result<(), StoreError> {
    let tags = serde_json::to_string(&portfolio.tags)
        .map_err(|e| StoreError::Database(format!("tags: {}", e)))?;
    sqlx::query(
        r#"
        INSERT INTO portfolios (account_id, total_value, total_invested, total_profit,
            total_profit_percentage, last_updated, is_public, description, tags, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(account_id) DO UPDATE SET
            total_value = excluded.total_value,
            total_invested = excluded.total_invested,
            total_profit = excluded.total_profit,
            total_profit_percentage = excluded.total_profit_percentage,
            last_updated = excluded.last_updated,
            is_public = excluded.is_public,
            description = excluded.description,
            tags = excluded.tags
        "#,
    )
    .bind(&portfolio.account_id.0)
    .bind(portfolio.total_value.to_string())
    .bind(portfolio.total_invested.to_string())
    .bind(portfolio.total_profit.to_string())
    .bind(portfolio.total_profit_percentage.to_string())
    .bind(portfolio.last_updated)
    .bind(portfolio.is_public)
    .bind(&portfolio.description)
    .bind(tags)
    .bind(portfolio.created_at)
    .execute(&mut *conn)
    .await
    .map_err(db_err)?;

    sqlx::query("DELETE FROM holdings WHERE account_id = ?")
        .bind(&portfolio.account_id.0)
        .execute(&mut *conn)
        .await
        .map_err(db_err)?;

    for (position, holding) in portfolio.holdings.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO holdings (account_id, coin_id, symbol, amount, average_buy_price,
                total_invested, last_updated, position)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&portfolio.account_id.0)
        .bind(&holding.coin_id.0)
        .bind(&holding.symbol)
        .bind(holding.amount.to_string())
        .bind(holding.average_buy_price.to_string())
        .bind(holding.total_invested.to_string())
        .bind(holding.last_updated)
        .bind(i64::try_from(position).unwrap_or(i64::MAX))
        .execute(&mut *conn)
        .await
        .map_err(db_err)?;
    }
    Ok(())
}

fn sort_column(field: PortfolioSortField) -> &'static str {
    match field {
        PortfolioSortField::TotalValue => "CAST(total_value AS REAL)",
        PortfolioSortField::TotalInvested => "CAST(total_invested AS REAL)",
        PortfolioSortField::TotalProfit => "CAST(total_profit AS REAL)",
        PortfolioSortField::TotalProfitPercentage => "CAST(total_profit_percentage AS REAL)",
        PortfolioSortField::LastUpdated => "last_updated",
    }
}

/// # Summary
/// `PortfolioStore` 的 SQLite 实现，组合汇总与持仓明细分表存储。
pub struct SqlitePortfolioStore {
    pool: SqlitePool,
}

impl SqlitePortfolioStore {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }
}

#[async_trait]
impl PortfolioStore for SqlitePortfolioStore {
    async fn get(&self, account_id: &AccountId) -> Result<Option<Portfolio>, StoreError> {
        let mut conn = self.pool.acquire().await.map_err(db_err)?;
        load_portfolio(&mut conn, account_id).await
    }

    async fn save(&self, portfolio: &Portfolio) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        write_portfolio(&mut tx, portfolio).await?;
        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn list_public(
        &self,
        sort: PortfolioSortField,
        order: SortOrder,
        page: PageRequest,
    ) -> Result<Page<Portfolio>, StoreError> {
        let mut conn = self.pool.acquire().await.map_err(db_err)?;
        let (total,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM portfolios WHERE is_public = 1")
                .fetch_one(&mut *conn)
                .await
                .map_err(db_err)?;

        let sql = format!(
            "SELECT {} FROM portfolios WHERE is_public = 1 ORDER BY {} {}, account_id LIMIT ? OFFSET ?",
            PORTFOLIO_COLUMNS,
            sort_column(sort),
            order.as_sql()
        );
        let rows: Vec<PortfolioRow> = sqlx::query_as(&sql)
            .bind(i64::from(page.limit))
            .bind(i64::try_from(page.offset()).unwrap_or(i64::MAX))
            .fetch_all(&mut *conn)
            .await
            .map_err(db_err)?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let holdings = load_holdings(&mut conn, &row.account_id).await?;
            items.push(into_portfolio(row, holdings)?);
        }
        Ok(Page::new(items, page, u64::try_from(total).unwrap_or_default()))
    }
}
