//! # 币种目录路由控制器
//!
//! 公开的币种查询接口，全部只返回活跃币种。

use axum::Json;
use axum::extract::State;

use tripcoin_core::catalog::entity::{
    Coin, CoinCategory, CoinId, CoinQuery, CoinSortField, HistoryPeriod, TrendingKind,
};
use tripcoin_core::common::{PageRequest, SortOrder};

use crate::error::ApiError;
use crate::extract::{ApiPath, ApiQuery};
use crate::server::AppState;
use crate::types::{
    ApiResponse, CoinListQuery, CoinListResponse, CoinResponse, LimitQuery, PeriodQuery,
    PriceHistoryResponse,
};

const DEFAULT_TOP_LIMIT: u32 = 10;
const MAX_TOP_LIMIT: u32 = 100;

fn top_limit(limit: Option<u32>) -> u32 {
    limit.unwrap_or(DEFAULT_TOP_LIMIT).clamp(1, MAX_TOP_LIMIT)
}

fn to_coins(coins: Vec<Coin>) -> Vec<CoinResponse> {
    coins.into_iter().map(Into::into).collect()
}

/// 分页查询币种列表
#[utoipa::path(
    get,
    path = "/api/v1/coins",
    tag = "币种 (Coins)",
    params(CoinListQuery),
    responses(
        (status = 200, description = "币种列表", body = ApiResponse<CoinListResponse>),
        (status = 400, description = "排序或分类参数无效")
    )
)]
pub async fn list_coins(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<CoinListQuery>,
) -> Result<Json<ApiResponse<CoinListResponse>>, ApiError> {
    let filter = CoinQuery {
        sort: query
            .sort
            .as_deref()
            .map(str::parse::<CoinSortField>)
            .transpose()
            .map_err(ApiError::BadRequest)?
            .unwrap_or_default(),
        order: query
            .order
            .as_deref()
            .map(str::parse::<SortOrder>)
            .transpose()
            .map_err(ApiError::BadRequest)?
            .unwrap_or_default(),
        search: query.search.filter(|s| !s.trim().is_empty()),
        category: query
            .category
            .as_deref()
            .map(str::parse::<CoinCategory>)
            .transpose()
            .map_err(ApiError::BadRequest)?,
    };
    let page = state
        .catalog
        .list(&filter, PageRequest::new(query.page, query.limit))
        .await?;

    Ok(Json(ApiResponse::ok(CoinListResponse {
        coins: to_coins(page.items),
        pagination: page.pagination,
    })))
}

/// 按 ID 查询币种
#[utoipa::path(
    get,
    path = "/api/v1/coins/{id}",
    tag = "币种 (Coins)",
    params(("id" = String, Path, description = "币种 ID")),
    responses(
        (status = 200, description = "币种详情", body = ApiResponse<CoinResponse>),
        (status = 404, description = "币种不存在")
    )
)]
pub async fn get_coin(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<ApiResponse<CoinResponse>>, ApiError> {
    let coin = state.catalog.get(&CoinId(id)).await?;
    Ok(Json(ApiResponse::ok(coin.into())))
}

/// 按代码查询币种 (大小写不敏感)
#[utoipa::path(
    get,
    path = "/api/v1/coins/symbol/{symbol}",
    tag = "币种 (Coins)",
    params(("symbol" = String, Path, description = "币种代码")),
    responses(
        (status = 200, description = "币种详情", body = ApiResponse<CoinResponse>),
        (status = 404, description = "币种不存在")
    )
)]
pub async fn get_coin_by_symbol(
    State(state): State<AppState>,
    ApiPath(symbol): ApiPath<String>,
) -> Result<Json<ApiResponse<CoinResponse>>, ApiError> {
    let coin = state.catalog.get_by_symbol(&symbol).await?;
    Ok(Json(ApiResponse::ok(coin.into())))
}

/// 市值前 N 的热门币种
#[utoipa::path(
    get,
    path = "/api/v1/coins/popular/top",
    tag = "币种 (Coins)",
    params(LimitQuery),
    responses(
        (status = 200, description = "热门币种", body = ApiResponse<Vec<CoinResponse>>)
    )
)]
pub async fn popular_coins(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<LimitQuery>,
) -> Result<Json<ApiResponse<Vec<CoinResponse>>>, ApiError> {
    let coins = state.catalog.popular(top_limit(query.limit)).await?;
    Ok(Json(ApiResponse::ok(to_coins(coins))))
}

/// 24 小时涨幅榜 (`gainers`) 或跌幅榜 (其余取值)
#[utoipa::path(
    get,
    path = "/api/v1/coins/trending/{type}",
    tag = "币种 (Coins)",
    params(
        ("type" = String, Path, description = "gainers 或 losers"),
        LimitQuery
    ),
    responses(
        (status = 200, description = "涨跌榜", body = ApiResponse<Vec<CoinResponse>>)
    )
)]
pub async fn trending_coins(
    State(state): State<AppState>,
    ApiPath(kind): ApiPath<String>,
    ApiQuery(query): ApiQuery<LimitQuery>,
) -> Result<Json<ApiResponse<Vec<CoinResponse>>>, ApiError> {
    let coins = state
        .catalog
        .trending(TrendingKind::parse(&kind), top_limit(query.limit))
        .await?;
    Ok(Json(ApiResponse::ok(to_coins(coins))))
}

/// 币种价格历史
#[utoipa::path(
    get,
    path = "/api/v1/coins/{id}/price-history",
    tag = "币种 (Coins)",
    params(
        ("id" = String, Path, description = "币种 ID"),
        PeriodQuery
    ),
    responses(
        (status = 200, description = "价格历史", body = ApiResponse<PriceHistoryResponse>),
        (status = 404, description = "币种不存在")
    )
)]
pub async fn price_history(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiQuery(query): ApiQuery<PeriodQuery>,
) -> Result<Json<ApiResponse<PriceHistoryResponse>>, ApiError> {
    let period_label = query.period.unwrap_or_else(|| "all".to_string());
    let (coin, history) = state
        .catalog
        .price_history(&CoinId(id), HistoryPeriod::parse(&period_label))
        .await?;
    Ok(Json(ApiResponse::ok(PriceHistoryResponse {
        coin_id: coin.id.0,
        symbol: coin.symbol,
        period: period_label,
        history,
    })))
}

/// 按名称或代码搜索币种
#[utoipa::path(
    get,
    path = "/api/v1/coins/search/{query}",
    tag = "币种 (Coins)",
    params(
        ("query" = String, Path, description = "搜索关键字"),
        LimitQuery
    ),
    responses(
        (status = 200, description = "搜索结果", body = ApiResponse<Vec<CoinResponse>>)
    )
)]
pub async fn search_coins(
    State(state): State<AppState>,
    ApiPath(text): ApiPath<String>,
    ApiQuery(query): ApiQuery<LimitQuery>,
) -> Result<Json<ApiResponse<Vec<CoinResponse>>>, ApiError> {
    let coins = state.catalog.search(&text, top_limit(query.limit)).await?;
    Ok(Json(ApiResponse::ok(to_coins(coins))))
}
