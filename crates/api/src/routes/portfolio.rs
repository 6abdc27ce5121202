//! # 投资组合路由控制器
//!
//! `/my` 系列接口需要 Bearer JWT；公开组合的浏览无需登录。

use axum::Json;
use axum::extract::State;

use tripcoin_core::account::entity::AccountId;
use tripcoin_core::catalog::entity::CoinId;
use tripcoin_core::common::{PageRequest, SortOrder};
use tripcoin_core::portfolio::entity::{PortfolioSettings, PortfolioSortField};
use tripcoin_trade::portfolio::BacktestRequest;

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::auth::CurrentUser;
use crate::server::AppState;
use crate::types::{
    ApiResponse, BacktestRequestBody, BacktestResponse, PortfolioDetailResponse,
    PortfolioListResponse, PortfolioResponse, PortfolioSettingsRequest, PortfolioStatsResponse,
    PublicPortfolioQuery,
};

/// 我的投资组合 (首次访问时创建)
#[utoipa::path(
    get,
    path = "/api/v1/portfolio/my",
    tag = "投资组合 (Portfolio)",
    security(("bearer_jwt" = [])),
    responses(
        (status = 200, description = "按现价重估后的组合", body = ApiResponse<PortfolioResponse>),
        (status = 401, description = "未认证")
    )
)]
pub async fn my_portfolio(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
) -> Result<Json<ApiResponse<PortfolioResponse>>, ApiError> {
    let portfolio = state.portfolios.my(&account.id).await?;
    Ok(Json(ApiResponse::ok(portfolio.into())))
}

/// 我的组合逐持仓估值明细
#[utoipa::path(
    get,
    path = "/api/v1/portfolio/my/detailed",
    tag = "投资组合 (Portfolio)",
    security(("bearer_jwt" = [])),
    responses(
        (status = 200, description = "估值明细", body = ApiResponse<PortfolioDetailResponse>),
        (status = 404, description = "尚未建立组合")
    )
)]
pub async fn my_portfolio_detailed(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
) -> Result<Json<ApiResponse<PortfolioDetailResponse>>, ApiError> {
    let detail = state.portfolios.detailed(&account.id).await?;
    Ok(Json(ApiResponse::ok(detail.into())))
}

/// 我的组合统计 (头部持仓与逐币种成绩)
#[utoipa::path(
    get,
    path = "/api/v1/portfolio/my/stats",
    tag = "投资组合 (Portfolio)",
    security(("bearer_jwt" = [])),
    responses(
        (status = 200, description = "组合统计", body = ApiResponse<PortfolioStatsResponse>),
        (status = 401, description = "未认证")
    )
)]
pub async fn my_portfolio_stats(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
) -> Result<Json<ApiResponse<PortfolioStatsResponse>>, ApiError> {
    let stats = state.portfolios.stats(&account.id).await?;
    Ok(Json(ApiResponse::ok(stats.into())))
}

/// 修改组合展示设置
#[utoipa::path(
    put,
    path = "/api/v1/portfolio/my/settings",
    tag = "投资组合 (Portfolio)",
    security(("bearer_jwt" = [])),
    request_body = PortfolioSettingsRequest,
    responses(
        (status = 200, description = "设置已保存", body = ApiResponse<PortfolioResponse>),
        (status = 401, description = "未认证")
    )
)]
pub async fn update_settings(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
    ApiJson(req): ApiJson<PortfolioSettingsRequest>,
) -> Result<Json<ApiResponse<PortfolioResponse>>, ApiError> {
    let settings = PortfolioSettings {
        is_public: req.is_public,
        description: req.description,
        tags: req.tags,
    };
    let portfolio = state.portfolios.update_settings(&account.id, settings).await?;
    Ok(Json(ApiResponse::ok(portfolio.into())))
}

/// 回测一笔假设交易，不写入任何数据
#[utoipa::path(
    post,
    path = "/api/v1/portfolio/my/backtest",
    tag = "投资组合 (Portfolio)",
    security(("bearer_jwt" = [])),
    request_body = BacktestRequestBody,
    responses(
        (status = 200, description = "回测结果", body = ApiResponse<BacktestResponse>),
        (status = 400, description = "参数无效、余额或持仓不足"),
        (status = 404, description = "币种不存在")
    )
)]
pub async fn backtest(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
    ApiJson(req): ApiJson<BacktestRequestBody>,
) -> Result<Json<ApiResponse<BacktestResponse>>, ApiError> {
    let request = BacktestRequest {
        coin_id: CoinId(req.coin_id),
        side: req.side,
        amount: req.amount,
        price: req.price,
    };
    let result = state.portfolios.backtest(&account.id, request).await?;
    Ok(Json(ApiResponse::ok(result.into())))
}

/// 公开组合列表
#[utoipa::path(
    get,
    path = "/api/v1/portfolio/public",
    tag = "投资组合 (Portfolio)",
    params(PublicPortfolioQuery),
    responses(
        (status = 200, description = "公开组合", body = ApiResponse<PortfolioListResponse>),
        (status = 400, description = "排序参数无效")
    )
)]
pub async fn public_portfolios(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PublicPortfolioQuery>,
) -> Result<Json<ApiResponse<PortfolioListResponse>>, ApiError> {
    let sort = query
        .sort
        .as_deref()
        .map(str::parse::<PortfolioSortField>)
        .transpose()
        .map_err(ApiError::BadRequest)?
        .unwrap_or_default();
    let order = query
        .order
        .as_deref()
        .map(str::parse::<SortOrder>)
        .transpose()
        .map_err(ApiError::BadRequest)?
        .unwrap_or_default();
    let page = state
        .portfolios
        .list_public(sort, order, PageRequest::new(query.page, query.limit))
        .await?;

    Ok(Json(ApiResponse::ok(PortfolioListResponse {
        portfolios: page.items.into_iter().map(Into::into).collect(),
        pagination: page.pagination,
    })))
}

/// 查看某个用户的公开组合，非公开时返回 404
#[utoipa::path(
    get,
    path = "/api/v1/portfolio/user/{user_id}",
    tag = "投资组合 (Portfolio)",
    params(("user_id" = String, Path, description = "用户 ID")),
    responses(
        (status = 200, description = "公开组合", body = ApiResponse<PortfolioResponse>),
        (status = 404, description = "组合不存在或未公开")
    )
)]
pub async fn user_portfolio(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<String>,
) -> Result<Json<ApiResponse<PortfolioResponse>>, ApiError> {
    let portfolio = state.portfolios.public_for(&AccountId(user_id)).await?;
    Ok(Json(ApiResponse::ok(portfolio.into())))
}
