use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tripcoin_core::account::entity::{
    Account, AccountId, DailyMissionStatus, OneTimeMissionStatus,
};
use tripcoin_core::account::port::AccountStore;
use tripcoin_core::store::error::StoreError;

use crate::db::{Database, db_err, parse_decimal, parse_enum};

const USER_COLUMNS: &str = "id, username, email, google_id, wallet_address, balance, point, \
    svt_point, monthly_earned, monthly_used, total_exchanged, rank, sns_share, survey, \
    daily_quiz, mini_game, role, is_active, last_login, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    username: String,
    email: Option<String>,
    google_id: Option<String>,
    wallet_address: Option<String>,
    balance: String,
    point: String,
    svt_point: String,
    monthly_earned: String,
    monthly_used: String,
    total_exchanged: String,
    rank: String,
    sns_share: bool,
    survey: bool,
    daily_quiz: bool,
    mini_game: bool,
    role: String,
    is_active: bool,
    last_login: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for Account {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Account {
            id: AccountId(row.id),
            username: row.username,
            email: row.email,
            google_id: row.google_id,
            wallet_address: row.wallet_address,
            balance: parse_decimal("balance", &row.balance)?,
            point: parse_decimal("point", &row.point)?,
            svt_point: parse_decimal("svt_point", &row.svt_point)?,
            monthly_earned: parse_decimal("monthly_earned", &row.monthly_earned)?,
            monthly_used: parse_decimal("monthly_used", &row.monthly_used)?,
            total_exchanged: parse_decimal("total_exchanged", &row.total_exchanged)?,
            rank: parse_enum(&row.rank)?,
            one_time_missions: OneTimeMissionStatus {
                sns_share: row.sns_share,
                survey: row.survey,
            },
            daily_missions: DailyMissionStatus {
                daily_quiz: row.daily_quiz,
                mini_game: row.mini_game,
            },
            role: parse_enum(&row.role)?,
            is_active: row.is_active,
            last_login: row.last_login,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// 按主键读取账户，供连接池与事务共用
pub(crate) async fn load_account(
    conn: &mut SqliteConnection,
    id: &AccountId,
) -> Result<Option<Account>, StoreError> {
    let sql = format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS);
    let row: Option<UserRow> = sqlx::query_as(&sql)
        .bind(&id.0)
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_err)?;
    row.map(Account::try_from).transpose()
}

/// 覆盖写入账户的可变字段
pub(crate) async fn write_account(
    conn: &mut SqliteConnection,
    account: &Account,
) -> Result<(), StoreError> {
    let result = sqlx::query(
        r#"
        UPDATE users SET
            username = ?, email = ?, google_id = ?, wallet_address = ?,
            balance = ?, point = ?, svt_point = ?,
            monthly_earned = ?, monthly_used = ?, total_exchanged = ?, rank = ?,
            sns_share = ?, survey = ?, daily_quiz = ?, mini_game = ?,
            role = ?, is_active = ?, last_login = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&account.username)
    .bind(&account.email)
    .bind(&account.google_id)
    .bind(&account.wallet_address)
    .bind(account.balance.to_string())
    .bind(account.point.to_string())
    .bind(account.svt_point.to_string())
    .bind(account.monthly_earned.to_string())
    .bind(account.monthly_used.to_string())
    .bind(account.total_exchanged.to_string())
    .bind(account.rank.to_string())
    .bind(account.one_time_missions.sns_share)
    .bind(account.one_time_missions.survey)
    .bind(account.daily_missions.daily_quiz)
    .bind(account.daily_missions.mini_game)
    .bind(account.role.to_string())
    .bind(account.is_active)
    .bind(account.last_login)
    .bind(account.updated_at)
    .bind(&account.id.0)
    .execute(&mut *conn)
    .await
    .map_err(db_err)?;

    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound);
    }
    Ok(())
}

/// # Summary
/// `AccountStore` 的 SQLite 实现，数据位于 `app.db` 的 `users` 表。
pub struct SqliteAccountStore {
    pool: SqlitePool,
}

impl SqliteAccountStore {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }

    async fn find_by(&self, column: &str, value: &str) -> Result<Option<Account>, StoreError> {
        let sql = format!("SELECT {} FROM users WHERE {} = ?", USER_COLUMNS, column);
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.map(Account::try_from).transpose()
    }
}

#[async_trait]
impl AccountStore for SqliteAccountStore {
    async fn insert(&self, account: &Account) -> Result<(), StoreError> {
        let sql = format!(
            "INSERT INTO users ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            USER_COLUMNS
        );
        sqlx::query(&sql)
            .bind(&account.id.0)
            .bind(&account.username)
            .bind(&account.email)
            .bind(&account.google_id)
            .bind(&account.wallet_address)
            .bind(account.balance.to_string())
            .bind(account.point.to_string())
            .bind(account.svt_point.to_string())
            .bind(account.monthly_earned.to_string())
            .bind(account.monthly_used.to_string())
            .bind(account.total_exchanged.to_string())
            .bind(account.rank.to_string())
            .bind(account.one_time_missions.sns_share)
            .bind(account.one_time_missions.survey)
            .bind(account.daily_missions.daily_quiz)
            .bind(account.daily_missions.mini_game)
            .bind(account.role.to_string())
            .bind(account.is_active)
            .bind(account.last_login)
            .bind(account.created_at)
            .bind(account.updated_at)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn save(&self, account: &Account) -> Result<(), StoreError> {
        let mut conn = self.pool.acquire().await.map_err(db_err)?;
        write_account(&mut conn, account).await
    }

    async fn get(&self, id: &AccountId) -> Result<Option<Account>, StoreError> {
        let mut conn = self.pool.acquire().await.map_err(db_err)?;
        load_account(&mut conn, id).await
    }

    async fn find_by_wallet(&self, wallet_address: &str) -> Result<Option<Account>, StoreError> {
        self.find_by("wallet_address", wallet_address).await
    }

    async fn find_by_google_id(&self, google_id: &str) -> Result<Option<Account>, StoreError> {
        self.find_by("google_id", google_id).await
    }

    async fn list_ids(&self) -> Result<Vec<AccountId>, StoreError> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT id FROM users ORDER BY created_at")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(rows.into_iter().map(|(id,)| AccountId(id)).collect())
    }

    async fn rankings(&self, limit: u32) -> Result<Vec<Account>, StoreError> {
        let sql = format!(
            "SELECT {} FROM users WHERE is_active = 1 \
             ORDER BY CAST(point AS REAL) DESC, CAST(svt_point AS REAL) DESC LIMIT ?",
            USER_COLUMNS
        );
        let rows: Vec<UserRow> = sqlx::query_as(&sql)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.into_iter().map(Account::try_from).collect()
    }
}
