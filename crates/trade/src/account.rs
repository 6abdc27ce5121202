use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, warn};
use tripcoin_core::account::entity::{Account, AccountId, Mission, PointKind};
use tripcoin_core::account::error::AccountError;
use tripcoin_core::account::port::AccountStore;
use tripcoin_core::common::time::TimeProvider;
use tripcoin_core::store::error::StoreError;

use crate::lock::AccountLocks;

/// 新开账户的初始资产
#[derive(Debug, Clone, Copy)]
pub struct OpeningGrant {
    pub balance: Decimal,
    pub points: Decimal,
}

/// # Summary
/// 账户账本服务。所有余额与积分的变更都经由这里，在账户锁内完成 "读取 - 修改 - 写回"。
///
/// # Invariants
/// - 与 `TradeService` 共享同一张 `AccountLocks`，积分变更与交易结算不会交错。
pub struct AccountLedger {
    store: Arc<dyn AccountStore>,
    locks: Arc<AccountLocks>,
    clock: Arc<dyn TimeProvider>,
    grant: OpeningGrant,
}

impl AccountLedger {
    pub fn new(
        store: Arc<dyn AccountStore>,
        locks: Arc<AccountLocks>,
        clock: Arc<dyn TimeProvider>,
        grant: OpeningGrant,
    ) -> Self {
        Self {
            store,
            locks,
            clock,
            grant,
        }
    }

    pub async fn get(&self, id: &AccountId) -> Result<Account, AccountError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| AccountError::NotFound(id.0.clone()))
    }

    pub async fn find_by_wallet(&self, wallet_address: &str) -> Result<Account, AccountError> {
        self.store
            .find_by_wallet(wallet_address)
            .await?
            .ok_or_else(|| AccountError::NotFound(wallet_address.to_string()))
    }

    /// # Logic
    /// 在账户锁内读取账户，执行变更闭包，成功后刷新 `updated_at` 并写回。
    /// 闭包返回错误时不写回，账户保持原状。
    async fn mutate<F>(&self, id: &AccountId, f: F) -> Result<Account, AccountError>
    where
        F: FnOnce(&mut Account) -> Result<(), AccountError> + Send,
    {
        let _guard = self.locks.acquire(id).await;
        let mut account = self.get(id).await?;
        f(&mut account)?;
        account.updated_at = self.clock.now();
        self.store.save(&account).await?;
        Ok(account)
    }

    /// 积分入账，同时累加本月获得并重算段位
    pub async fn credit(
        &self,
        id: &AccountId,
        amount: Decimal,
        kind: PointKind,
    ) -> Result<Account, AccountError> {
        let account = self
            .mutate(id, |acct| acct.credit_points(amount, kind))
            .await?;
        info!("Credited {} {:?} to account {}", amount, kind, id);
        Ok(account)
    }

    /// 积分扣减，余额不足时返回 `InsufficientFunds`
    pub async fn debit(
        &self,
        id: &AccountId,
        amount: Decimal,
        kind: PointKind,
    ) -> Result<Account, AccountError> {
        let account = self
            .mutate(id, |acct| acct.debit_points(amount, kind))
            .await?;
        info!("Debited {} {:?} from account {}", amount, kind, id);
        Ok(account)
    }

    /// # Summary
    /// 完成任务并发放奖励。
    ///
    /// # Arguments
    /// * `mission_id` - 任务标识，无法识别时返回校验错误
    /// * `points` - 奖励的普通积分，为零时只标记完成
    pub async fn complete_mission(
        &self,
        id: &AccountId,
        mission_id: &str,
        points: Decimal,
    ) -> Result<Account, AccountError> {
        let mission: Mission = mission_id.parse().map_err(AccountError::Validation)?;
        let account = self
            .mutate(id, |acct| acct.complete_mission(mission, points))
            .await?;
        info!("Account {} completed mission {}", id, mission);
        Ok(account)
    }

    pub async fn reset_monthly_stats(&self, id: &AccountId) -> Result<Account, AccountError> {
        self.mutate(id, |acct| {
            acct.reset_monthly_stats();
            Ok(())
        })
        .await
    }

    pub async fn reset_daily_missions(&self, id: &AccountId) -> Result<Account, AccountError> {
        self.mutate(id, |acct| {
            acct.reset_daily_missions();
            Ok(())
        })
        .await
    }

    /// # Summary
    /// 对全部账户执行月度统计清零。
    ///
    /// # Returns
    /// 成功处理的账户数。单个账户失败只记录日志，不中断其余账户。
    pub async fn reset_monthly_stats_all(&self) -> Result<usize, AccountError> {
        let ids = self.store.list_ids().await?;
        let mut done = 0;
        for id in &ids {
            match self.reset_monthly_stats(id).await {
                Ok(_) => done += 1,
                Err(e) => warn!("Monthly reset failed for account {}: {}", id, e),
            }
        }
        info!("Monthly stats reset for {}/{} accounts", done, ids.len());
        Ok(done)
    }

    /// 对全部账户重置每日任务，语义同 `reset_monthly_stats_all`
    pub async fn reset_daily_missions_all(&self) -> Result<usize, AccountError> {
        let ids = self.store.list_ids().await?;
        let mut done = 0;
        for id in &ids {
            match self.reset_daily_missions(id).await {
                Ok(_) => done += 1,
                Err(e) => warn!("Daily mission reset failed for account {}: {}", id, e),
            }
        }
        info!("Daily missions reset for {}/{} accounts", done, ids.len());
        Ok(done)
    }

    /// # Summary
    /// 按钱包地址查找账户，不存在时开户。
    ///
    /// # Logic
    /// 1. 已存在则直接返回。
    /// 2. 否则以 `User_<毫秒时间戳>` 为用户名开户。
    /// 3. 并发开户撞上唯一约束时，回读已存在的账户。
    pub async fn find_or_open_by_wallet(&self, wallet_address: &str) -> Result<Account, AccountError> {
        let wallet_address = wallet_address.trim();
        if wallet_address.is_empty() {
            return Err(AccountError::Validation("wallet address is required".into()));
        }
        if let Some(account) = self.store.find_by_wallet(wallet_address).await? {
            return Ok(account);
        }

        let mut account = self.new_account();
        account.wallet_address = Some(wallet_address.to_string());
        match self.store.insert(&account).await {
            Ok(()) => {
                info!("Opened account {} for wallet {}", account.id, wallet_address);
                Ok(account)
            }
            Err(StoreError::Conflict(_)) => self.find_by_wallet(wallet_address).await,
            Err(e) => Err(e.into()),
        }
    }

    /// # Summary
    /// Google 登录: 按 Google 主体 ID 查找账户，存在则刷新最后登录时间，不存在则开户。
    pub async fn login_with_google(
        &self,
        google_id: &str,
        email: Option<String>,
    ) -> Result<Account, AccountError> {
        if let Some(existing) = self.store.find_by_google_id(google_id).await? {
            let now = self.clock.now();
            return self
                .mutate(&existing.id, |acct| {
                    acct.last_login = now;
                    Ok(())
                })
                .await;
        }

        let mut account = self.new_account();
        account.google_id = Some(google_id.to_string());
        account.email = email;
        match self.store.insert(&account).await {
            Ok(()) => {
                info!("Opened account {} via Google login", account.id);
                Ok(account)
            }
            Err(StoreError::Conflict(_)) => self
                .store
                .find_by_google_id(google_id)
                .await?
                .ok_or_else(|| AccountError::NotFound(google_id.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn rankings(&self, limit: u32) -> Result<Vec<Account>, AccountError> {
        Ok(self.store.rankings(limit).await?)
    }

    fn new_account(&self) -> Account {
        let now = self.clock.now();
        Account::new(
            AccountId(uuid::Uuid::new_v4().to_string()),
            format!("User_{}", now.timestamp_millis()),
            self.grant.balance,
            self.grant.points,
            now,
        )
    }
}
