use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// # Summary
/// 币种 (可交易标的) 的唯一标识。
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct CoinId(pub String);

impl fmt::Display for CoinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 币种分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CoinCategory {
    #[default]
    Cryptocurrency,
    Token,
    Defi,
    Nft,
    Other,
}

impl fmt::Display for CoinCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoinCategory::Cryptocurrency => write!(f, "cryptocurrency"),
            CoinCategory::Token => write!(f, "token"),
            CoinCategory::Defi => write!(f, "defi"),
            CoinCategory::Nft => write!(f, "nft"),
            CoinCategory::Other => write!(f, "other"),
        }
    }
}

impl FromStr for CoinCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cryptocurrency" => Ok(CoinCategory::Cryptocurrency),
            "token" => Ok(CoinCategory::Token),
            "defi" => Ok(CoinCategory::Defi),
            "nft" => Ok(CoinCategory::Nft),
            "other" => Ok(CoinCategory::Other),
            _ => Err(format!("Unknown coin category: {}", s)),
        }
    }
}

/// 24 小时价格走势
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PriceStatus {
    Up,
    Down,
    Stable,
}

/// # Summary
/// 币种行情与元数据。
///
/// # Invariants
/// - `symbol` 去除首尾空白后以大写存储，且全局唯一。
/// - `current_price`、`market_cap`、`volume_24h` 不为负。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coin {
    pub id: CoinId,
    pub symbol: String,
    pub name: String,
    pub current_price: Decimal,
    pub market_cap: Decimal,
    pub volume_24h: Decimal,
    pub price_change_24h: Decimal,
    pub price_change_percentage_24h: Decimal,
    pub high_24h: Decimal,
    pub low_24h: Decimal,
    pub circulating_supply: Decimal,
    pub total_supply: Decimal,
    pub max_supply: Option<Decimal>,
    pub image: Option<String>,
    pub description: String,
    pub website: Option<String>,
    pub whitepaper: Option<String>,
    pub is_active: bool,
    pub category: CoinCategory,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Coin {
    pub fn price_status(&self) -> PriceStatus {
        if self.price_change_percentage_24h > Decimal::ZERO {
            PriceStatus::Up
        } else if self.price_change_percentage_24h < Decimal::ZERO {
            PriceStatus::Down
        } else {
            PriceStatus::Stable
        }
    }
}

/// 规范化币种代码: 去空白并转大写
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

/// 价格历史中的单个采样点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PricePoint {
    pub price: Decimal,
    pub timestamp: DateTime<Utc>,
}

/// # Summary
/// 价格历史查询窗口。无法识别的取值视为全部历史。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryPeriod {
    OneHour,
    OneDay,
    SevenDays,
    ThirtyDays,
    All,
}

impl HistoryPeriod {
    pub fn parse(s: &str) -> Self {
        match s {
            "1h" => HistoryPeriod::OneHour,
            "24h" => HistoryPeriod::OneDay,
            "7d" => HistoryPeriod::SevenDays,
            "30d" => HistoryPeriod::ThirtyDays,
            _ => HistoryPeriod::All,
        }
    }

    /// 窗口起点，`All` 返回 `None`
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let span = match self {
            HistoryPeriod::OneHour => Duration::hours(1),
            HistoryPeriod::OneDay => Duration::hours(24),
            HistoryPeriod::SevenDays => Duration::days(7),
            HistoryPeriod::ThirtyDays => Duration::days(30),
            HistoryPeriod::All => return None,
        };
        Some(now - span)
    }
}

/// 币种列表的排序字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoinSortField {
    #[default]
    MarketCap,
    CurrentPrice,
    Volume24h,
    PriceChangePercentage24h,
}

impl FromStr for CoinSortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "marketCap" => Ok(CoinSortField::MarketCap),
            "currentPrice" => Ok(CoinSortField::CurrentPrice),
            "volume24h" => Ok(CoinSortField::Volume24h),
            "priceChangePercentage24h" => Ok(CoinSortField::PriceChangePercentage24h),
            _ => Err(format!("Unknown sort field: {}", s)),
        }
    }
}

/// # Summary
/// 币种列表筛选条件。只返回活跃币种。
#[derive(Debug, Clone, Default)]
pub struct CoinQuery {
    pub sort: CoinSortField,
    pub order: crate::common::SortOrder,
    /// 名称或代码的大小写不敏感子串匹配
    pub search: Option<String>,
    pub category: Option<CoinCategory>,
}

/// 涨跌榜类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendingKind {
    Gainers,
    Losers,
}

impl TrendingKind {
    /// `gainers` 以外的取值一律视为跌幅榜
    pub fn parse(s: &str) -> Self {
        if s == "gainers" {
            TrendingKind::Gainers
        } else {
            TrendingKind::Losers
        }
    }
}

/// # Summary
/// 管理员新增币种的输入。
#[derive(Debug, Clone, Default)]
pub struct NewCoin {
    pub symbol: String,
    pub name: String,
    pub current_price: Decimal,
    pub market_cap: Decimal,
    pub volume_24h: Decimal,
    pub price_change_24h: Decimal,
    pub price_change_percentage_24h: Decimal,
    pub high_24h: Decimal,
    pub low_24h: Decimal,
    pub circulating_supply: Decimal,
    pub total_supply: Decimal,
    pub max_supply: Option<Decimal>,
    pub image: Option<String>,
    pub description: String,
    pub website: Option<String>,
    pub whitepaper: Option<String>,
    pub category: CoinCategory,
}

/// # Summary
/// 管理员部分更新币种的输入，`None` 表示保持原值。
#[derive(Debug, Clone, Default)]
pub struct CoinUpdate {
    pub name: Option<String>,
    pub current_price: Option<Decimal>,
    pub market_cap: Option<Decimal>,
    pub volume_24h: Option<Decimal>,
    pub price_change_24h: Option<Decimal>,
    pub price_change_percentage_24h: Option<Decimal>,
    pub high_24h: Option<Decimal>,
    pub low_24h: Option<Decimal>,
    pub circulating_supply: Option<Decimal>,
    pub total_supply: Option<Decimal>,
    pub max_supply: Option<Decimal>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub whitepaper: Option<String>,
    pub is_active: Option<bool>,
    pub category: Option<CoinCategory>,
}

impl CoinUpdate {
    /// # Summary
    /// 将更新合并进币种。
    ///
    /// # Returns
    /// 若 `current_price` 发生变化则返回新价格，调用方据此追加价格历史。
    pub fn apply(self, coin: &mut Coin, now: DateTime<Utc>) -> Option<Decimal> {
        let mut price_changed = None;
        if let Some(price) = self.current_price
            && price != coin.current_price
        {
            coin.current_price = price;
            price_changed = Some(price);
        }
        if let Some(v) = self.name {
            coin.name = v;
        }
        if let Some(v) = self.market_cap {
            coin.market_cap = v;
        }
        if let Some(v) = self.volume_24h {
            coin.volume_24h = v;
        }
        if let Some(v) = self.price_change_24h {
            coin.price_change_24h = v;
        }
        if let Some(v) = self.price_change_percentage_24h {
            coin.price_change_percentage_24h = v;
        }
        if let Some(v) = self.high_24h {
            coin.high_24h = v;
        }
        if let Some(v) = self.low_24h {
            coin.low_24h = v;
        }
        if let Some(v) = self.circulating_supply {
            coin.circulating_supply = v;
        }
        if let Some(v) = self.total_supply {
            coin.total_supply = v;
        }
        if self.max_supply.is_some() {
            coin.max_supply = self.max_supply;
        }
        if self.image.is_some() {
            coin.image = self.image;
        }
        if let Some(v) = self.description {
            coin.description = v;
        }
        if self.website.is_some() {
            coin.website = self.website;
        }
        if self.whitepaper.is_some() {
            coin.whitepaper = self.whitepaper;
        }
        if let Some(v) = self.is_active {
            coin.is_active = v;
        }
        if let Some(v) = self.category {
            coin.category = v;
        }
        coin.updated_at = now;
        price_changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn coin() -> Coin {
        let now = Utc::now();
        Coin {
            id: CoinId("c1".into()),
            symbol: "BTC".into(),
            name: "Bitcoin".into(),
            current_price: dec!(10),
            market_cap: dec!(1000),
            volume_24h: Decimal::ZERO,
            price_change_24h: Decimal::ZERO,
            price_change_percentage_24h: Decimal::ZERO,
            high_24h: Decimal::ZERO,
            low_24h: Decimal::ZERO,
            circulating_supply: Decimal::ZERO,
            total_supply: Decimal::ZERO,
            max_supply: None,
            image: None,
            description: String::new(),
            website: None,
            whitepaper: None,
            is_active: true,
            category: CoinCategory::Cryptocurrency,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_price_status_follows_sign_of_change() {
        let mut c = coin();
        assert_eq!(c.price_status(), PriceStatus::Stable);
        c.price_change_percentage_24h = dec!(1.5);
        assert_eq!(c.price_status(), PriceStatus::Up);
        c.price_change_percentage_24h = dec!(-0.1);
        assert_eq!(c.price_status(), PriceStatus::Down);
    }

    #[test]
    fn test_update_reports_price_change_only_when_different() {
        let mut c = coin();
        let same = CoinUpdate {
            current_price: Some(dec!(10)),
            name: Some("Bitcoin Core".into()),
            ..Default::default()
        };
        assert_eq!(same.apply(&mut c, Utc::now()), None);
        assert_eq!(c.name, "Bitcoin Core");

        let changed = CoinUpdate {
            current_price: Some(dec!(12)),
            ..Default::default()
        };
        assert_eq!(changed.apply(&mut c, Utc::now()), Some(dec!(12)));
        assert_eq!(c.current_price, dec!(12));
    }

    #[test]
    fn test_history_period_parsing() {
        let now = Utc::now();
        assert_eq!(HistoryPeriod::parse("1h").cutoff(now), Some(now - Duration::hours(1)));
        assert_eq!(HistoryPeriod::parse("30d").cutoff(now), Some(now - Duration::days(30)));
        assert_eq!(HistoryPeriod::parse("forever").cutoff(now), None);
    }

    #[test]
    fn test_symbol_normalization() {
        assert_eq!(normalize_symbol("  btc "), "BTC");
    }
}
