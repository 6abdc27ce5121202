//! # DTO (Data Transfer Object) 层
//!
//! 将内部领域模型转化为面向前端 JSON 输出的轻量结构体。
//! 所有 DTO 必须派生 `utoipa::ToSchema` 以自动进入 Swagger 文档，字段统一使用 camelCase。

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use tripcoin_core::account::entity::{
    Account, DailyMissionStatus, OneTimeMissionStatus, PointKind, Rank, UserRole,
};
use tripcoin_core::catalog::entity::{
    Coin, CoinCategory, CoinUpdate, NewCoin, PricePoint, PriceStatus,
};
use tripcoin_core::common::Pagination;
use tripcoin_core::portfolio::entity::{Holding, Portfolio, ProfitStatus};
use tripcoin_core::trade::entity::{OrderSide, SideStats, TotalStats, Trade, TradeStats, TradeStatus};
use tripcoin_trade::portfolio::{
    BacktestResult, HoldingDetail, PortfolioDetail, PortfolioStats, TopHolding,
};

// ============================================================
//  通用响应 DTO
// ============================================================

/// 统一 API 响应包装器
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T: Serialize + ToSchema> {
    /// 是否成功
    pub success: bool,
    /// 数据载荷 (成功时)
    pub data: Option<T>,
    /// 错误信息 (失败时)
    pub error: Option<String>,
}

impl<T: Serialize + ToSchema> ApiResponse<T> {
    /// 构建成功响应
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

/// 构建失败响应 (不含泛型载荷)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApiErrorResponse {
    /// 固定为 false
    pub success: bool,
    /// 错误描述信息
    pub error: String,
}

impl ApiErrorResponse {
    /// 从错误信息构建
    pub fn from_msg(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: msg.into(),
        }
    }
}

/// 仅包含提示信息的响应
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Logged out")]
    pub message: String,
}

/// 单个 `limit` 查询参数
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LimitQuery {
    /// 返回条目数
    pub limit: Option<u32>,
}

// ============================================================
//  鉴权与用户 DTO
// ============================================================

/// Google 登录请求体
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GoogleLoginRequest {
    /// Google 颁发的 ID Token
    #[schema(example = "eyJhbGciOiJSUzI1NiIsImtpZCI6...")]
    pub id_token: String,
}

/// 登录成功返回的 Token
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// JWT Bearer Token
    #[schema(example = "eyJhbGciOiJIUzI1NiIs...")]
    pub token: String,
    /// Token 有效期 (秒)
    #[schema(example = 86400)]
    pub expires_in: u64,
    pub user: UserResponse,
}

/// JWT Claims 内容 (内部使用，不暴露到 Swagger)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// 账户唯一标识
    pub sub: String,
    /// 角色 ("user" 或 "admin")
    pub role: String,
    /// Token 过期时间 (Unix 时间戳)
    pub exp: u64,
}

/// 用户资料 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[schema(example = "5f0c6a0e-1d2b-4f7a-9a51-2d8f1e0b7c11")]
    pub id: String,
    #[schema(example = "User_1710000000000")]
    pub username: String,
    pub email: Option<String>,
    pub wallet_address: Option<String>,
    /// 模拟交易现金余额
    #[schema(example = 1000000)]
    pub balance: Decimal,
    #[schema(example = 100)]
    pub point: Decimal,
    #[schema(example = 0)]
    pub svt_point: Decimal,
    pub total_points: Decimal,
    pub monthly_earned: Decimal,
    pub monthly_used: Decimal,
    pub total_exchanged: Decimal,
    pub rank: Rank,
    pub role: UserRole,
    pub one_time_mission_status: OneTimeMissionStatus,
    pub daily_mission_status: DailyMissionStatus,
    pub last_login: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<Account> for UserResponse {
    fn from(a: Account) -> Self {
        Self {
            total_points: a.total_points(),
            id: a.id.0,
            username: a.username,
            email: a.email,
            wallet_address: a.wallet_address,
            balance: a.balance,
            point: a.point,
            svt_point: a.svt_point,
            monthly_earned: a.monthly_earned,
            monthly_used: a.monthly_used,
            total_exchanged: a.total_exchanged,
            rank: a.rank,
            role: a.role,
            one_time_mission_status: a.one_time_missions,
            daily_mission_status: a.daily_missions,
            last_login: a.last_login,
            created_at: a.created_at,
        }
    }
}

/// 完成任务请求体
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompleteMissionRequest {
    /// 任务标识: sns_share / survey / daily_quiz / mini_game
    #[schema(example = "daily_quiz")]
    pub mission_id: String,
    /// 奖励积分，缺省为 0
    #[schema(example = 10)]
    pub points: Option<Decimal>,
}

/// 完成任务响应
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MissionResponse {
    pub mission_id: String,
    pub points: Decimal,
    pub user: UserResponse,
}

/// 积分增减请求体
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PointsRequest {
    #[schema(example = 50)]
    pub amount: Decimal,
    /// 积分类型，缺省为普通积分
    #[serde(rename = "type")]
    pub kind: Option<PointKind>,
}

/// 积分增减响应
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PointsResponse {
    /// 变更后对应类型的积分余额
    pub new_balance: Decimal,
    pub user: UserResponse,
}

/// 排行榜条目
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RankingEntry {
    /// 名次，从 1 开始
    #[schema(example = 1)]
    pub position: usize,
    pub username: String,
    pub point: Decimal,
    pub svt_point: Decimal,
    pub total_points: Decimal,
    pub rank: Rank,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RankingsResponse {
    pub rankings: Vec<RankingEntry>,
}

impl RankingsResponse {
    pub fn from_accounts(accounts: Vec<Account>) -> Self {
        let rankings = accounts
            .into_iter()
            .enumerate()
            .map(|(i, a)| RankingEntry {
                position: i + 1,
                total_points: a.total_points(),
                username: a.username,
                point: a.point,
                svt_point: a.svt_point,
                rank: a.rank,
            })
            .collect();
        Self { rankings }
    }
}

// ============================================================
//  币种相关 DTO
// ============================================================

/// 币种 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CoinResponse {
    pub id: String,
    #[schema(example = "JEJU")]
    pub symbol: String,
    #[schema(example = "Jeju Coin")]
    pub name: String,
    #[schema(example = 12.5)]
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
    pub price_status: PriceStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Coin> for CoinResponse {
    fn from(c: Coin) -> Self {
        Self {
            price_status: c.price_status(),
            id: c.id.0,
            symbol: c.symbol,
            name: c.name,
            current_price: c.current_price,
            market_cap: c.market_cap,
            volume_24h: c.volume_24h,
            price_change_24h: c.price_change_24h,
            price_change_percentage_24h: c.price_change_percentage_24h,
            high_24h: c.high_24h,
            low_24h: c.low_24h,
            circulating_supply: c.circulating_supply,
            total_supply: c.total_supply,
            max_supply: c.max_supply,
            image: c.image,
            description: c.description,
            website: c.website,
            whitepaper: c.whitepaper,
            is_active: c.is_active,
            category: c.category,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CoinListResponse {
    pub coins: Vec<CoinResponse>,
    pub pagination: Pagination,
}

/// 币种列表查询参数
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CoinListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// marketCap / currentPrice / volume24h / priceChangePercentage24h
    pub sort: Option<String>,
    /// asc / desc
    pub order: Option<String>,
    /// 名称或代码的模糊搜索
    pub search: Option<String>,
    pub category: Option<String>,
}

/// 价格历史查询参数
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PeriodQuery {
    /// 1h / 24h / 7d / 30d，其余取全部历史
    pub period: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PriceHistoryResponse {
    pub coin_id: String,
    pub symbol: String,
    pub period: String,
    pub history: Vec<PricePoint>,
}

/// 管理员新增币种请求体
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCoinRequest {
    #[schema(example = "jeju")]
    pub symbol: String,
    #[schema(example = "Jeju Coin")]
    pub name: String,
    #[schema(example = 12.5)]
    pub current_price: Decimal,
    #[serde(default)]
    pub market_cap: Decimal,
    #[serde(default)]
    pub volume_24h: Decimal,
    #[serde(default)]
    pub price_change_24h: Decimal,
    #[serde(default)]
    pub price_change_percentage_24h: Decimal,
    #[serde(default)]
    pub high_24h: Decimal,
    #[serde(default)]
    pub low_24h: Decimal,
    #[serde(default)]
    pub circulating_supply: Decimal,
    #[serde(default)]
    pub total_supply: Decimal,
    pub max_supply: Option<Decimal>,
    pub image: Option<String>,
    #[serde(default)]
    pub description: String,
    pub website: Option<String>,
    pub whitepaper: Option<String>,
    #[serde(default)]
    pub category: CoinCategory,
}

/// 管理员部分更新币种请求体，缺省字段保持原值
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCoinRequest {
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

impl From<CreateCoinRequest> for NewCoin {
    fn from(r: CreateCoinRequest) -> Self {
        Self {
            symbol: r.symbol,
            name: r.name,
            current_price: r.current_price,
            market_cap: r.market_cap,
            volume_24h: r.volume_24h,
            price_change_24h: r.price_change_24h,
            price_change_percentage_24h: r.price_change_percentage_24h,
            high_24h: r.high_24h,
            low_24h: r.low_24h,
            circulating_supply: r.circulating_supply,
            total_supply: r.total_supply,
            max_supply: r.max_supply,
            image: r.image,
            description: r.description,
            website: r.website,
            whitepaper: r.whitepaper,
            category: r.category,
        }
    }
}

impl From<UpdateCoinRequest> for CoinUpdate {
    fn from(r: UpdateCoinRequest) -> Self {
        Self {
            name: r.name,
            current_price: r.current_price,
            market_cap: r.market_cap,
            volume_24h: r.volume_24h,
            price_change_24h: r.price_change_24h,
            price_change_percentage_24h: r.price_change_percentage_24h,
            high_24h: r.high_24h,
            low_24h: r.low_24h,
            circulating_supply: r.circulating_supply,
            total_supply: r.total_supply,
            max_supply: r.max_supply,
            image: r.image,
            description: r.description,
            website: r.website,
            whitepaper: r.whitepaper,
            is_active: r.is_active,
            category: r.category,
        }
    }
}

// ============================================================
//  交易相关 DTO
// ============================================================

/// 下单请求体
///
/// `orderType` 决定价格字段: `limit` 必须携带 `limitPrice`，`stop` 必须携带 `stopPrice`。
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaceTradeRequest {
    pub coin_id: String,
    #[serde(rename = "type")]
    pub side: OrderSide,
    #[schema(example = 50)]
    pub amount: Decimal,
    /// market / limit / stop，缺省为 market
    #[schema(example = "market")]
    pub order_type: Option<String>,
    pub limit_price: Option<Decimal>,
    pub stop_price: Option<Decimal>,
    pub notes: Option<String>,
}

/// 订单 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TradeResponse {
    pub id: String,
    pub user_id: String,
    pub coin_id: String,
    #[schema(example = "JEJU")]
    pub symbol: String,
    #[serde(rename = "type")]
    pub side: OrderSide,
    pub amount: Decimal,
    pub price: Decimal,
    pub total_value: Decimal,
    pub fee: Decimal,
    #[schema(example = "market")]
    pub order_type: String,
    pub limit_price: Option<Decimal>,
    pub stop_price: Option<Decimal>,
    pub status: TradeStatus,
    pub notes: String,
    pub executed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Trade> for TradeResponse {
    fn from(t: Trade) -> Self {
        Self {
            id: t.id.0,
            user_id: t.account_id.0,
            coin_id: t.coin_id.0,
            symbol: t.symbol,
            side: t.side,
            amount: t.amount,
            price: t.price,
            total_value: t.total_value,
            fee: t.fee,
            order_type: t.order_type.kind().to_string(),
            limit_price: t.order_type.limit_price(),
            stop_price: t.order_type.stop_price(),
            status: t.status,
            notes: t.notes,
            executed_at: t.executed_at,
            created_at: t.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TradeListResponse {
    pub trades: Vec<TradeResponse>,
    pub pagination: Pagination,
}

/// 我的订单查询参数
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct TradeListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// buy / sell
    #[serde(rename = "type")]
    pub side: Option<String>,
    /// pending / completed / cancelled / failed
    pub status: Option<String>,
    pub coin_id: Option<String>,
}

/// 交易统计 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TradeStatsResponse {
    #[schema(example = "7d")]
    pub period: String,
    pub buy: SideStats,
    pub sell: SideStats,
    pub total: TotalStats,
}

impl From<TradeStats> for TradeStatsResponse {
    fn from(s: TradeStats) -> Self {
        Self {
            period: s.period.as_str().to_string(),
            buy: s.buy,
            sell: s.sell,
            total: s.total,
        }
    }
}

// ============================================================
//  投资组合 DTO
// ============================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HoldingResponse {
    pub coin_id: String,
    pub symbol: String,
    pub amount: Decimal,
    pub average_buy_price: Decimal,
    pub total_invested: Decimal,
    pub last_updated: DateTime<Utc>,
}

impl From<Holding> for HoldingResponse {
    fn from(h: Holding) -> Self {
        Self {
            coin_id: h.coin_id.0,
            symbol: h.symbol,
            amount: h.amount,
            average_buy_price: h.average_buy_price,
            total_invested: h.total_invested,
            last_updated: h.last_updated,
        }
    }
}

/// 投资组合 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioResponse {
    pub user_id: String,
    pub holdings: Vec<HoldingResponse>,
    pub total_value: Decimal,
    pub total_invested: Decimal,
    pub total_profit: Decimal,
    pub total_profit_percentage: Decimal,
    pub profit_status: ProfitStatus,
    pub is_public: bool,
    pub description: String,
    pub tags: Vec<String>,
    pub last_updated: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<Portfolio> for PortfolioResponse {
    fn from(p: Portfolio) -> Self {
        Self {
            profit_status: p.profit_status(),
            user_id: p.account_id.0,
            holdings: p.holdings.into_iter().map(Into::into).collect(),
            total_value: p.total_value,
            total_invested: p.total_invested,
            total_profit: p.total_profit,
            total_profit_percentage: p.total_profit_percentage,
            is_public: p.is_public,
            description: p.description,
            tags: p.tags,
            last_updated: p.last_updated,
            created_at: p.created_at,
        }
    }
}

/// 单个持仓的估值明细
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HoldingDetailResponse {
    pub coin_id: String,
    pub symbol: String,
    pub name: String,
    pub amount: Decimal,
    pub average_buy_price: Decimal,
    pub total_invested: Decimal,
    pub current_price: Decimal,
    pub current_value: Decimal,
    pub profit: Decimal,
    pub profit_percentage: Decimal,
}

impl From<HoldingDetail> for HoldingDetailResponse {
    fn from(d: HoldingDetail) -> Self {
        Self {
            coin_id: d.holding.coin_id.0,
            symbol: d.holding.symbol,
            name: d.name,
            amount: d.holding.amount,
            average_buy_price: d.holding.average_buy_price,
            total_invested: d.holding.total_invested,
            current_price: d.current_price,
            current_value: d.valuation.current_value,
            profit: d.valuation.profit,
            profit_percentage: d.valuation.profit_percentage,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PortfolioDetailResponse {
    pub portfolio: PortfolioResponse,
    pub holdings: Vec<HoldingDetailResponse>,
}

impl From<PortfolioDetail> for PortfolioDetailResponse {
    fn from(d: PortfolioDetail) -> Self {
        Self {
            portfolio: d.portfolio.into(),
            holdings: d.holdings.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopHoldingResponse {
    pub symbol: String,
    pub name: String,
    pub amount: Decimal,
    pub current_value: Decimal,
    /// 占组合总价值的百分比
    pub percentage: Decimal,
}

impl From<TopHolding> for TopHoldingResponse {
    fn from(t: TopHolding) -> Self {
        Self {
            symbol: t.symbol,
            name: t.name,
            amount: t.amount,
            current_value: t.current_value,
            percentage: t.percentage,
        }
    }
}

/// 投资组合统计 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioStatsResponse {
    pub total_holdings: usize,
    pub total_value: Decimal,
    pub total_invested: Decimal,
    pub total_profit: Decimal,
    pub total_profit_percentage: Decimal,
    pub top_holdings: Vec<TopHoldingResponse>,
    pub performance: Vec<HoldingDetailResponse>,
}

impl From<PortfolioStats> for PortfolioStatsResponse {
    fn from(s: PortfolioStats) -> Self {
        Self {
            total_holdings: s.total_holdings,
            total_value: s.total_value,
            total_invested: s.total_invested,
            total_profit: s.total_profit,
            total_profit_percentage: s.total_profit_percentage,
            top_holdings: s.top_holdings.into_iter().map(Into::into).collect(),
            performance: s.performance.into_iter().map(Into::into).collect(),
        }
    }
}

/// 组合展示设置，缺省字段保持原值
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSettingsRequest {
    pub is_public: Option<bool>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// 回测请求体
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BacktestRequestBody {
    pub coin_id: String,
    #[serde(rename = "type")]
    pub side: OrderSide,
    pub amount: Decimal,
    /// 假设的成交价格
    pub price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BacktestResponse {
    #[serde(rename = "type")]
    pub side: OrderSide,
    pub symbol: String,
    pub amount: Decimal,
    pub price: Decimal,
    pub total_value: Decimal,
    pub fee: Decimal,
    pub total_with_fee: Decimal,
    pub new_balance: Decimal,
    pub portfolio_value: Decimal,
    pub portfolio_profit: Decimal,
    pub evaluated_at: DateTime<Utc>,
}

impl From<BacktestResult> for BacktestResponse {
    fn from(r: BacktestResult) -> Self {
        Self {
            side: r.side,
            symbol: r.symbol,
            amount: r.amount,
            price: r.price,
            total_value: r.total_value,
            fee: r.fee,
            total_with_fee: r.total_with_fee,
            new_balance: r.new_balance,
            portfolio_value: r.portfolio_value,
            portfolio_profit: r.portfolio_profit,
            evaluated_at: r.evaluated_at,
        }
    }
}

/// 公开组合列表查询参数
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PublicPortfolioQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// totalValue / totalInvested / totalProfit / totalProfitPercentage / lastUpdated
    pub sort: Option<String>,
    pub order: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PortfolioListResponse {
    pub portfolios: Vec<PortfolioResponse>,
    pub pagination: Pagination,
}
