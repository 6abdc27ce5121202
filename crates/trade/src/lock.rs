use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tripcoin_core::account::entity::AccountId;

/// # Summary
/// 按账户划分的异步互斥锁表。
///
/// 账本变更与交易结算共享同一张锁表，保证同一账户的"校验 + 执行"串行发生，
/// 不同账户之间互不阻塞。
///
/// # Invariants
/// - 同一 `AccountId` 始终映射到同一把锁。
#[derive(Default)]
pub struct AccountLocks {
    locks: DashMap<AccountId, Arc<Mutex<()>>>,
}

impl AccountLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Logic
    /// 取出 (或创建) 账户对应的锁，释放 DashMap 分片引用后再异步等待，避免持有分片锁跨越 await。
    pub async fn acquire(&self, account_id: &AccountId) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(account_id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone();
        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_account_is_serialized() {
        let locks = Arc::new(AccountLocks::new());
        let a = AccountId("a".into());
        let guard = locks.acquire(&a).await;

        let locks2 = locks.clone();
        let a2 = a.clone();
        let waiter = tokio::spawn(async move {
            let _g = locks2.acquire(&a2).await;
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        // 其他账户不受影响
        let _other = locks.acquire(&AccountId("b".into())).await;

        drop(guard);
        waiter.await.unwrap();
    }
}
