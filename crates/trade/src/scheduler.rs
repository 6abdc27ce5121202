use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc};
use std::sync::Arc;
use tokio::task::AbortHandle;
use tracing::{error, info};
use tripcoin_core::common::time::TimeProvider;

use crate::account::AccountLedger;

/// 严格晚于 `now` 的下一个 UTC 零点
pub fn next_daily_reset(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive()
        .succ_opt()
        .map_or(now + Duration::days(1), |d| d.and_time(NaiveTime::MIN).and_utc())
}

/// # Summary
/// 周期维护任务: 每个 UTC 零点重置每日任务，每月首日额外清零月度统计。
///
/// 两项重置都走 `AccountLedger` 的显式账本操作，在账户锁内逐户执行。
pub struct MaintenanceJob {
    ledger: Arc<AccountLedger>,
    clock: Arc<dyn TimeProvider>,
}

impl MaintenanceJob {
    pub fn new(ledger: Arc<AccountLedger>, clock: Arc<dyn TimeProvider>) -> Self {
        Self { ledger, clock }
    }

    /// # Logic
    /// 执行 `at` 时刻到期的维护: 每日任务总是重置，`at` 为月初时再清零月度统计。
    pub async fn run_due(&self, at: DateTime<Utc>) {
        if let Err(e) = self.ledger.reset_daily_missions_all().await {
            error!("Daily mission reset failed: {}", e);
        }
        if at.day() == 1 {
            if let Err(e) = self.ledger.reset_monthly_stats_all().await {
                error!("Monthly stats reset failed: {}", e);
            }
        }
    }

    /// # Summary
    /// 启动后台维护循环。
    ///
    /// # Returns
    /// 可用于停止循环的 `AbortHandle`。
    pub fn spawn(self) -> AbortHandle {
        let handle = tokio::spawn(async move {
            loop {
                let now = self.clock.now();
                let wake = next_daily_reset(now);
                info!("Next maintenance run at {}", wake);
                let wait = (wake - now).to_std().unwrap_or_default();
                tokio::time::sleep(wait).await;
                self.run_due(wake).await;
            }
        });
        handle.abort_handle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_next_daily_reset() {
        let now = Utc.with_ymd_and_hms(2026, 3, 14, 23, 59, 59).unwrap();
        assert_eq!(
            next_daily_reset(now),
            Utc.with_ymd_and_hms(2026, 3, 15, 0, 0, 0).unwrap()
        );
        let midnight = Utc.with_ymd_and_hms(2026, 3, 15, 0, 0, 0).unwrap();
        assert_eq!(
            next_daily_reset(midnight),
            Utc.with_ymd_and_hms(2026, 3, 16, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_daily_reset_rolls_into_next_month_and_year() {
        let now = Utc.with_ymd_and_hms(2026, 12, 31, 8, 0, 0).unwrap();
        let wake = next_daily_reset(now);
        assert_eq!(wake, Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(wake.day(), 1);
    }
}
