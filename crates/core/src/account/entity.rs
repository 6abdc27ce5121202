use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use super::error::AccountError;

/// # Summary
/// 系统内的唯一账户标识。
///
/// # Invariants
/// - AccountId 在整个系统中必须全局唯一。
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct AccountId(pub String);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 用户名最大长度
pub const MAX_USERNAME_LEN: usize = 50;

/// # Summary
/// 等级段位，由积分分数按升序阈值决定。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Rank {
    Bronze,
    Silver,
    Gold,
    Platinum,
    Diamond,
}

impl Rank {
    /// # Logic
    /// 依次比较升序阈值: <500 青铜, <2000 白银, <5000 黄金, <10000 铂金, 其余钻石。
    pub fn from_score(score: Decimal) -> Self {
        if score < dec!(500) {
            Rank::Bronze
        } else if score < dec!(2000) {
            Rank::Silver
        } else if score < dec!(5000) {
            Rank::Gold
        } else if score < dec!(10000) {
            Rank::Platinum
        } else {
            Rank::Diamond
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rank::Bronze => write!(f, "bronze"),
            Rank::Silver => write!(f, "silver"),
            Rank::Gold => write!(f, "gold"),
            Rank::Platinum => write!(f, "platinum"),
            Rank::Diamond => write!(f, "diamond"),
        }
    }
}

impl FromStr for Rank {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bronze" => Ok(Rank::Bronze),
            "silver" => Ok(Rank::Silver),
            "gold" => Ok(Rank::Gold),
            "platinum" => Ok(Rank::Platinum),
            "diamond" => Ok(Rank::Diamond),
            _ => Err(format!("Unknown rank: {}", s)),
        }
    }
}

/// # Summary
/// 用户角色。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::User => write!(f, "user"),
            UserRole::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(UserRole::User),
            "admin" => Ok(UserRole::Admin),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// # Summary
/// 积分币种。`Point` 为普通积分，`Svt` 为代币积分。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum PointKind {
    #[default]
    #[serde(rename = "point")]
    Point,
    #[serde(rename = "SVT")]
    Svt,
}

/// # Summary
/// 可完成的任务。以 `daily_` 开头的任务每日重置，其余为一次性任务。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mission {
    SnsShare,
    Survey,
    DailyQuiz,
    MiniGame,
}

impl Mission {
    pub fn is_daily(&self) -> bool {
        matches!(self, Mission::DailyQuiz | Mission::MiniGame)
    }
}

impl FromStr for Mission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sns_share" => Ok(Mission::SnsShare),
            "survey" => Ok(Mission::Survey),
            "daily_quiz" => Ok(Mission::DailyQuiz),
            "mini_game" | "daily_mini_game" => Ok(Mission::MiniGame),
            _ => Err(format!("Unknown mission: {}", s)),
        }
    }
}

impl fmt::Display for Mission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mission::SnsShare => write!(f, "sns_share"),
            Mission::Survey => write!(f, "survey"),
            Mission::DailyQuiz => write!(f, "daily_quiz"),
            Mission::MiniGame => write!(f, "mini_game"),
        }
    }
}

/// 一次性任务完成状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OneTimeMissionStatus {
    pub sns_share: bool,
    pub survey: bool,
}

/// 每日任务完成状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DailyMissionStatus {
    pub daily_quiz: bool,
    pub mini_game: bool,
}

/// # Summary
/// 账户聚合根，同时承载现金余额、两种积分、月度统计与段位。
///
/// # Invariants
/// - `balance`、`point`、`svt_point` 以及三项统计计数永不为负。
/// - 余额类字段只能通过本类型提供的账本操作修改。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub username: String,
    pub email: Option<String>,
    pub google_id: Option<String>,
    pub wallet_address: Option<String>,
    /// 模拟交易使用的现金等价余额
    pub balance: Decimal,
    pub point: Decimal,
    pub svt_point: Decimal,
    pub monthly_earned: Decimal,
    pub monthly_used: Decimal,
    pub total_exchanged: Decimal,
    pub rank: Rank,
    pub one_time_missions: OneTimeMissionStatus,
    pub daily_missions: DailyMissionStatus,
    pub role: UserRole,
    pub is_active: bool,
    pub last_login: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// # Logic
    /// 创建一个新的普通用户账户，段位按初始积分计算。
    pub fn new(
        id: AccountId,
        username: String,
        initial_balance: Decimal,
        initial_points: Decimal,
        now: DateTime<Utc>,
    ) -> Self {
        let mut account = Self {
            id,
            username,
            email: None,
            google_id: None,
            wallet_address: None,
            balance: initial_balance.max(Decimal::ZERO),
            point: initial_points.max(Decimal::ZERO),
            svt_point: Decimal::ZERO,
            monthly_earned: Decimal::ZERO,
            monthly_used: Decimal::ZERO,
            total_exchanged: Decimal::ZERO,
            rank: Rank::Bronze,
            one_time_missions: OneTimeMissionStatus::default(),
            daily_missions: DailyMissionStatus::default(),
            role: UserRole::User,
            is_active: true,
            last_login: now,
            created_at: now,
            updated_at: now,
        };
        account.update_rank();
        account
    }

    /// 普通积分与代币积分之和
    pub fn total_points(&self) -> Decimal {
        self.point.saturating_add(self.svt_point)
    }

    /// 段位分数 = 普通积分 + 代币积分 + 本月获得，超出可表示范围时取上限
    pub fn rank_score(&self) -> Decimal {
        self.total_points().saturating_add(self.monthly_earned)
    }

    /// 按当前分数重新计算段位
    pub fn update_rank(&mut self) {
        self.rank = Rank::from_score(self.rank_score());
    }

    /// # Summary
    /// 积分入账。
    ///
    /// # Logic
    /// 1. 拒绝非正数金额。
    /// 2. 增加目标积分及本月获得计数。
    /// 3. 重新计算段位。
    /// 4. 任一计数溢出返回 `InvalidAmount`，账户保持不变。
    pub fn credit_points(&mut self, amount: Decimal, kind: PointKind) -> Result<(), AccountError> {
        ensure_positive(amount)?;
        let target = match kind {
            PointKind::Point => self.point,
            PointKind::Svt => self.svt_point,
        };
        let balance = checked_add(target, amount)?;
        let monthly_earned = checked_add(self.monthly_earned, amount)?;
        match kind {
            PointKind::Point => self.point = balance,
            PointKind::Svt => self.svt_point = balance,
        }
        self.monthly_earned = monthly_earned;
        self.update_rank();
        Ok(())
    }

    /// # Summary
    /// 积分扣减 (兑换)。
    ///
    /// # Logic
    /// 1. 拒绝非正数金额。
    /// 2. 余额不足时返回 `InsufficientFunds`，账户保持不变。
    /// 3. 扣减积分，累加本月使用与累计兑换计数。
    pub fn debit_points(&mut self, amount: Decimal, kind: PointKind) -> Result<(), AccountError> {
        ensure_positive(amount)?;
        let target = match kind {
            PointKind::Point => &mut self.point,
            PointKind::Svt => &mut self.svt_point,
        };
        if *target < amount {
            return Err(AccountError::InsufficientFunds {
                required: amount,
                actual: *target,
            });
        }
        let monthly_used = checked_add(self.monthly_used, amount)?;
        let total_exchanged = checked_add(self.total_exchanged, amount)?;
        *target -= amount;
        self.monthly_used = monthly_used;
        self.total_exchanged = total_exchanged;
        Ok(())
    }

    /// 从现金余额中扣款，余额不足时拒绝
    pub fn withdraw(&mut self, amount: Decimal) -> Result<(), AccountError> {
        ensure_positive(amount)?;
        if self.balance < amount {
            return Err(AccountError::InsufficientFunds {
                required: amount,
                actual: self.balance,
            });
        }
        self.balance -= amount;
        Ok(())
    }

    /// 向现金余额入账
    pub fn deposit(&mut self, amount: Decimal) -> Result<(), AccountError> {
        ensure_positive(amount)?;
        self.balance = checked_add(self.balance, amount)?;
        Ok(())
    }

    /// # Summary
    /// 标记任务完成并发放奖励积分。
    ///
    /// # Logic
    /// 1. 已完成的任务不可重复领取。
    /// 2. 写入对应的一次性/每日状态位。
    /// 3. `points > 0` 时以普通积分入账。
    pub fn complete_mission(&mut self, mission: Mission, points: Decimal) -> Result<(), AccountError> {
        if points.is_sign_negative() {
            return Err(AccountError::InvalidAmount(points));
        }
        if *self.mission_flag(mission) {
            return Err(AccountError::MissionAlreadyCompleted(mission.to_string()));
        }
        if points > Decimal::ZERO {
            self.credit_points(points, PointKind::Point)?;
        }
        *self.mission_flag(mission) = true;
        Ok(())
    }

    fn mission_flag(&mut self, mission: Mission) -> &mut bool {
        match mission {
            Mission::SnsShare => &mut self.one_time_missions.sns_share,
            Mission::Survey => &mut self.one_time_missions.survey,
            Mission::DailyQuiz => &mut self.daily_missions.daily_quiz,
            Mission::MiniGame => &mut self.daily_missions.mini_game,
        }
    }

    /// 清零月度统计，由定时任务在每月初调用
    pub fn reset_monthly_stats(&mut self) {
        self.monthly_earned = Decimal::ZERO;
        self.monthly_used = Decimal::ZERO;
    }

    /// 重置每日任务状态
    pub fn reset_daily_missions(&mut self) {
        self.daily_missions = DailyMissionStatus::default();
    }
}

fn checked_add(current: Decimal, amount: Decimal) -> Result<Decimal, AccountError> {
    current
        .checked_add(amount)
        .ok_or(AccountError::InvalidAmount(amount))
}

fn ensure_positive(amount: Decimal) -> Result<(), AccountError> {
    if amount <= Decimal::ZERO {
        return Err(AccountError::InvalidAmount(amount));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> Account {
        Account::new(
            AccountId("acct-1".into()),
            "tester".into(),
            dec!(1000),
            dec!(100),
            Utc::now(),
        )
    }

    #[test]
    fn test_rank_thresholds_are_ascending_cutoffs() {
        assert_eq!(Rank::from_score(dec!(0)), Rank::Bronze);
        assert_eq!(Rank::from_score(dec!(499.99)), Rank::Bronze);
        assert_eq!(Rank::from_score(dec!(500)), Rank::Silver);
        assert_eq!(Rank::from_score(dec!(1999)), Rank::Silver);
        assert_eq!(Rank::from_score(dec!(2000)), Rank::Gold);
        assert_eq!(Rank::from_score(dec!(5000)), Rank::Platinum);
        assert_eq!(Rank::from_score(dec!(9999.9)), Rank::Platinum);
        assert_eq!(Rank::from_score(dec!(10000)), Rank::Diamond);
    }

    #[test]
    fn test_credit_updates_monthly_and_rank() {
        let mut acct = account();
        acct.credit_points(dec!(200), PointKind::Point).unwrap();
        // score = 300 + 0 + 200
        assert_eq!(acct.point, dec!(300));
        assert_eq!(acct.monthly_earned, dec!(200));
        assert_eq!(acct.rank, Rank::Silver);

        acct.credit_points(dec!(1000), PointKind::Svt).unwrap();
        assert_eq!(acct.svt_point, dec!(1000));
        assert_eq!(acct.rank_score(), dec!(2500));
        assert_eq!(acct.rank, Rank::Gold);
    }

    #[test]
    fn test_non_positive_credit_is_rejected() {
        let mut acct = account();
        let before = acct.clone();
        assert!(matches!(
            acct.credit_points(dec!(-5), PointKind::Point),
            Err(AccountError::InvalidAmount(_))
        ));
        assert!(acct.credit_points(Decimal::ZERO, PointKind::Svt).is_err());
        assert_eq!(acct, before);
    }

    #[test]
    fn test_debit_insufficient_leaves_account_untouched() {
        let mut acct = account();
        let before = acct.clone();
        let err = acct.debit_points(dec!(101), PointKind::Point).unwrap_err();
        assert!(matches!(err, AccountError::InsufficientFunds { .. }));
        assert_eq!(acct, before);

        acct.debit_points(dec!(40), PointKind::Point).unwrap();
        assert_eq!(acct.point, dec!(60));
        assert_eq!(acct.monthly_used, dec!(40));
        assert_eq!(acct.total_exchanged, dec!(40));
    }

    #[test]
    fn test_withdraw_and_deposit_cash() {
        let mut acct = account();
        assert!(acct.withdraw(dec!(1000.01)).is_err());
        acct.withdraw(dec!(500.5)).unwrap();
        assert_eq!(acct.balance, dec!(499.5));
        acct.deposit(dec!(0.5)).unwrap();
        assert_eq!(acct.balance, dec!(500));
    }

    #[test]
    fn test_overflowing_amounts_are_rejected() {
        let mut acct = account();
        acct.point = Decimal::MAX;
        let before = acct.clone();
        assert!(matches!(
            acct.credit_points(dec!(1), PointKind::Point),
            Err(AccountError::InvalidAmount(_))
        ));
        assert!(acct.complete_mission(Mission::Survey, dec!(1)).is_err());
        assert!(!acct.one_time_missions.survey);
        assert_eq!(acct, before);
        assert_eq!(acct.rank_score(), Decimal::MAX);

        acct.balance = Decimal::MAX;
        assert!(acct.deposit(dec!(1)).is_err());
        assert_eq!(acct.balance, Decimal::MAX);
    }

    #[test]
    fn test_complete_mission_once() {
        let mut acct = account();
        acct.complete_mission(Mission::DailyQuiz, dec!(50)).unwrap();
        assert!(acct.daily_missions.daily_quiz);
        assert_eq!(acct.point, dec!(150));

        let err = acct.complete_mission(Mission::DailyQuiz, dec!(50)).unwrap_err();
        assert!(matches!(err, AccountError::MissionAlreadyCompleted(_)));

        acct.reset_daily_missions();
        acct.complete_mission(Mission::DailyQuiz, Decimal::ZERO).unwrap();
        assert_eq!(acct.point, dec!(150));

        acct.complete_mission(Mission::SnsShare, dec!(10)).unwrap();
        assert!(acct.one_time_missions.sns_share);
    }

    #[test]
    fn test_reset_monthly_stats() {
        let mut acct = account();
        acct.credit_points(dec!(10), PointKind::Point).unwrap();
        acct.debit_points(dec!(5), PointKind::Point).unwrap();
        acct.reset_monthly_stats();
        assert_eq!(acct.monthly_earned, Decimal::ZERO);
        assert_eq!(acct.monthly_used, Decimal::ZERO);
        assert_eq!(acct.total_exchanged, dec!(5));
    }

    #[test]
    fn test_mission_ids() {
        assert_eq!("daily_quiz".parse::<Mission>().unwrap(), Mission::DailyQuiz);
        assert!("daily_quiz".parse::<Mission>().unwrap().is_daily());
        assert!(!Mission::Survey.is_daily());
        assert!("unknown".parse::<Mission>().is_err());
    }
}
