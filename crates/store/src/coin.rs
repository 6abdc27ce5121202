use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use std::collections::HashMap;
use tripcoin_core::catalog::entity::{
    Coin, CoinId, CoinQuery, CoinSortField, PricePoint, TrendingKind,
};
use tripcoin_core::catalog::port::CoinStore;
use tripcoin_core::common::{Page, PageRequest};
use tripcoin_core::store::error::StoreError;

use crate::db::{Database, db_err, like_pattern, parse_decimal, parse_enum, parse_opt_decimal};

const COIN_COLUMNS: &str = "id, symbol, name, current_price, market_cap, volume_24h, \
    price_change_24h, price_change_percentage_24h, high_24h, low_24h, circulating_supply, \
    total_supply, max_supply, image, description, website, whitepaper, is_active, category, \
    created_at, updated_at";

#[derive(sqlx::FromRow)]
struct CoinRow {
    id: String,
    symbol: String,
    name: String,
    current_price: String,
    market_cap: String,
    volume_24h: String,
    price_change_24h: String,
    price_change_percentage_24h: String,
    high_24h: String,
    low_24h: String,
    circulating_supply: String,
    total_supply: String,
    max_supply: Option<String>,
    image: Option<String>,
    description: String,
    website: Option<String>,
    whitepaper: Option<String>,
    is_active: bool,
    category: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CoinRow> for Coin {
    type Error = StoreError;

    fn try_from(row: CoinRow) -> Result<Self, Self::Error> {
        Ok(Coin {
            id: CoinId(row.id),
            symbol: row.symbol,
            name: row.name,
            current_price: parse_decimal("current_price", &row.current_price)?,
            market_cap: parse_decimal("market_cap", &row.market_cap)?,
            volume_24h: parse_decimal("volume_24h", &row.volume_24h)?,
            price_change_24h: parse_decimal("price_change_24h", &row.price_change_24h)?,
            price_change_percentage_24h: parse_decimal(
                "price_change_percentage_24h",
                &row.price_change_percentage_24h,
            )?,
            high_24h: parse_decimal("high_24h", &row.high_24h)?,
            low_24h: parse_decimal("low_24h", &row.low_24h)?,
            circulating_supply: parse_decimal("circulating_supply", &row.circulating_supply)?,
            total_supply: parse_decimal("total_supply", &row.total_supply)?,
            max_supply: parse_opt_decimal("max_supply", row.max_supply.as_deref())?,
            image: row.image,
            description: row.description,
            website: row.website,
            whitepaper: row.whitepaper,
            is_active: row.is_active,
            category: parse_enum(&row.category)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn sort_column(field: CoinSortField) -> &'static str {
    match field {
        CoinSortField::MarketCap => "CAST(market_cap AS REAL)",
        CoinSortField::CurrentPrice => "CAST(current_price AS REAL)",
        CoinSortField::Volume24h => "CAST(volume_24h AS REAL)",
        CoinSortField::PriceChangePercentage24h => "CAST(price_change_percentage_24h AS REAL)",
    }
}

/// 追加活跃币种的筛选条件
fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, query: &CoinQuery) {
    builder.push(" WHERE is_active = 1");
    if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = like_pattern(search.trim());
        builder
            .push(" AND (LOWER(name) LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR LOWER(symbol) LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }
    if let Some(category) = query.category {
        builder.push(" AND category = ").push_bind(category.to_string());
    }
}

/// 一次查询读取一组币种的当前价格
pub(crate) async fn load_prices(
    conn: &mut SqliteConnection,
    ids: &[CoinId],
) -> Result<HashMap<CoinId, Decimal>, StoreError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let mut builder = QueryBuilder::<Sqlite>::new("SELECT id, current_price FROM coins WHERE id IN (");
    let mut separated = builder.separated(", ");
    for id in ids {
        separated.push_bind(id.0.clone());
    }
    separated.push_unseparated(")");

    let rows: Vec<(String, String)> = builder
        .build_query_as()
        .fetch_all(&mut *conn)
        .await
        .map_err(db_err)?;
    rows.into_iter()
        .map(|(id, price)| Ok((CoinId(id), parse_decimal("current_price", &price)?)))
        .collect()
}

async fn load_coins(
    conn: &mut SqliteConnection,
    ids: &[CoinId],
) -> Result<HashMap<CoinId, Coin>, StoreError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let mut builder = QueryBuilder::<Sqlite>::new(format!(
        "SELECT {} FROM coins WHERE id IN (",
        COIN_COLUMNS
    ));
    let mut separated = builder.separated(", ");
    for id in ids {
        separated.push_bind(id.0.clone());
    }
    separated.push_unseparated(")");

    let rows: Vec<CoinRow> = builder
        .build_query_as()
        .fetch_all(&mut *conn)
        .await
        .map_err(db_err)?;
    rows.into_iter()
        .map(|row| Coin::try_from(row).map(|coin| (coin.id.clone(), coin)))
        .collect()
}

pub(crate) async fn load_coin(
    conn: &mut SqliteConnection,
    id: &CoinId,
) -> Result<Option<Coin>, StoreError> {
    let sql = format!("SELECT {} FROM coins WHERE id = ?", COIN_COLUMNS);
    let row: Option<CoinRow> = sqlx::query_as(&sql)
        .bind(&id.0)
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_err)?;
    row.map(Coin::try_from).transpose()
}

async fn append_price(
    conn: &mut SqliteConnection,
    id: &CoinId,
    sample: &PricePoint,
) -> Result<(), StoreError> {
    sqlx::query("INSERT INTO price_history (coin_id, price, timestamp) VALUES (?, ?, ?)")
        .bind(&id.0)
        .bind(sample.price.to_string())
        .bind(sample.timestamp)
        .execute(&mut *conn)
        .await
        .map_err(db_err)?;
    Ok(())
}

/// # Summary
/// `CoinStore` 的 SQLite 实现。币种写入与价格历史追加在同一事务内完成。
pub struct SqliteCoinStore {
    pool: SqlitePool,
}

impl SqliteCoinStore {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }

    async fn fetch_ordered(&self, order_by: &str, limit: u32) -> Result<Vec<Coin>, StoreError> {
        let sql = format!(
            "SELECT {} FROM coins WHERE is_active = 1 ORDER BY {} LIMIT ?",
            COIN_COLUMNS, order_by
        );
        let rows: Vec<CoinRow> = sqlx::query_as(&sql)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.into_iter().map(Coin::try_from).collect()
    }
}

#[async_trait]
impl CoinStore for SqliteCoinStore {
    async fn insert(&self, coin: &Coin) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        let sql = format!(
            "INSERT INTO coins ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            COIN_COLUMNS
        );
        sqlx::query(&sql)
            .bind(&coin.id.0)
            .bind(&coin.symbol)
            .bind(&coin.name)
            .bind(coin.current_price.to_string())
            .bind(coin.market_cap.to_string())
            .bind(coin.volume_24h.to_string())
            .bind(coin.price_change_24h.to_string())
            .bind(coin.price_change_percentage_24h.to_string())
            .bind(coin.high_24h.to_string())
            .bind(coin.low_24h.to_string())
            .bind(coin.circulating_supply.to_string())
            .bind(coin.total_supply.to_string())
            .bind(coin.max_supply.map(|v| v.to_string()))
            .bind(&coin.image)
            .bind(&coin.description)
            .bind(&coin.website)
            .bind(&coin.whitepaper)
            .bind(coin.is_active)
            .bind(coin.category.to_string())
            .bind(coin.created_at)
            .bind(coin.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        let sample = PricePoint {
            price: coin.current_price,
            timestamp: coin.created_at,
        };
        append_price(&mut tx, &coin.id, &sample).await?;
        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn save(&self, coin: &Coin, price_sample: Option<PricePoint>) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        let result = sqlx::query(
            r#"
            UPDATE coins SET
                symbol = ?, name = ?, current_price = ?, market_cap = ?, volume_24h = ?,
                price_change_24h = ?, price_change_percentage_24h = ?, high_24h = ?, low_24h = ?,
                circulating_supply = ?, total_supply = ?, max_supply = ?, image = ?,
                description = ?, website = ?, whitepaper = ?, is_active = ?, category = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&coin.symbol)
        .bind(&coin.name)
        .bind(coin.current_price.to_string())
        .bind(coin.market_cap.to_string())
        .bind(coin.volume_24h.to_string())
        .bind(coin.price_change_24h.to_string())
        .bind(coin.price_change_percentage_24h.to_string())
        .bind(coin.high_24h.to_string())
        .bind(coin.low_24h.to_string())
        .bind(coin.circulating_supply.to_string())
        .bind(coin.total_supply.to_string())
        .bind(coin.max_supply.map(|v| v.to_string()))
        .bind(&coin.image)
        .bind(&coin.description)
        .bind(&coin.website)
        .bind(&coin.whitepaper)
        .bind(coin.is_active)
        .bind(coin.category.to_string())
        .bind(coin.updated_at)
        .bind(&coin.id.0)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        if let Some(sample) = price_sample {
            append_price(&mut tx, &coin.id, &sample).await?;
        }
        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn get(&self, id: &CoinId) -> Result<Option<Coin>, StoreError> {
        let mut conn = self.pool.acquire().await.map_err(db_err)?;
        load_coin(&mut conn, id).await
    }

    async fn find_by_symbol(&self, symbol: &str) -> Result<Option<Coin>, StoreError> {
        let sql = format!(
            "SELECT {} FROM coins WHERE symbol = ? AND is_active = 1",
            COIN_COLUMNS
        );
        let row: Option<CoinRow> = sqlx::query_as(&sql)
            .bind(symbol.trim().to_uppercase())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.map(Coin::try_from).transpose()
    }

    async fn list(&self, query: &CoinQuery, page: PageRequest) -> Result<Page<Coin>, StoreError> {
        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM coins");
        push_filters(&mut count, query);
        let (total,): (i64,) = count
            .build_query_as()
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;

        let mut select = QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM coins", COIN_COLUMNS));
        push_filters(&mut select, query);
        select
            .push(" ORDER BY ")
            .push(sort_column(query.sort))
            .push(" ")
            .push(query.order.as_sql())
            .push(", id LIMIT ")
            .push_bind(i64::from(page.limit))
            .push(" OFFSET ")
            .push_bind(i64::try_from(page.offset()).unwrap_or(i64::MAX));
        let rows: Vec<CoinRow> = select
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        let items = rows
            .into_iter()
            .map(Coin::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, page, u64::try_from(total).unwrap_or_default()))
    }

    async fn popular(&self, limit: u32) -> Result<Vec<Coin>, StoreError> {
        self.fetch_ordered("CAST(market_cap AS REAL) DESC", limit).await
    }

    async fn trending(&self, kind: TrendingKind, limit: u32) -> Result<Vec<Coin>, StoreError> {
        let order_by = match kind {
            TrendingKind::Gainers => "CAST(price_change_percentage_24h AS REAL) DESC",
            TrendingKind::Losers => "CAST(price_change_percentage_24h AS REAL) ASC",
        };
        self.fetch_ordered(order_by, limit).await
    }

    async fn search(&self, query: &str, limit: u32) -> Result<Vec<Coin>, StoreError> {
        let pattern = like_pattern(query.trim());
        let sql = format!(
            "SELECT {} FROM coins WHERE is_active = 1 \
             AND (LOWER(name) LIKE ? ESCAPE '\\' OR LOWER(symbol) LIKE ? ESCAPE '\\') \
             ORDER BY CAST(market_cap AS REAL) DESC LIMIT ?",
            COIN_COLUMNS
        );
        let rows: Vec<CoinRow> = sqlx::query_as(&sql)
            .bind(&pattern)
            .bind(&pattern)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.into_iter().map(Coin::try_from).collect()
    }

    async fn price_history(
        &self,
        id: &CoinId,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<PricePoint>, StoreError> {
        let rows: Vec<(String, DateTime<Utc>)> = match since {
            Some(cutoff) => sqlx::query_as(
                "SELECT price, timestamp FROM price_history WHERE coin_id = ? AND timestamp > ? ORDER BY timestamp, id",
            )
            .bind(&id.0)
            .bind(cutoff)
            .fetch_all(&self.pool)
            .await,
            None => sqlx::query_as(
                "SELECT price, timestamp FROM price_history WHERE coin_id = ? ORDER BY timestamp, id",
            )
            .bind(&id.0)
            .fetch_all(&self.pool)
            .await,
        }
        .map_err(db_err)?;

        rows.into_iter()
            .map(|(price, timestamp)| {
                Ok(PricePoint {
                    price: parse_decimal("price", &price)?,
                    timestamp,
                })
            })
            .collect()
    }

    async fn get_many(&self, ids: &[CoinId]) -> Result<HashMap<CoinId, Coin>, StoreError> {
        let mut conn = self.pool.acquire().await.map_err(db_err)?;
        load_coins(&mut conn, ids).await
    }
}
