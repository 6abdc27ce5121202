//! # 模拟交易路由控制器
//!
//! 下单、撤单、订单查询与交易统计。全部接口需要 Bearer JWT。

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use utoipa::IntoParams;

use tripcoin_core::catalog::entity::CoinId;
use tripcoin_core::common::PageRequest;
use tripcoin_core::trade::entity::{
    OrderSide, OrderType, StatsPeriod, TradeFilter, TradeId, TradeRequest, TradeStatus,
};

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::auth::CurrentUser;
use crate::server::AppState;
use crate::types::{
    ApiResponse, PlaceTradeRequest, TradeListQuery, TradeListResponse, TradeResponse,
    TradeStatsResponse,
};

/// 交易统计查询参数
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StatsQuery {
    /// all / 1d / 7d / 30d
    pub period: Option<String>,
}

impl TryFrom<PlaceTradeRequest> for TradeRequest {
    type Error = ApiError;

    fn try_from(req: PlaceTradeRequest) -> Result<Self, Self::Error> {
        let kind = req.order_type.as_deref().unwrap_or("market");
        let order_type = OrderType::from_parts(kind, req.limit_price, req.stop_price)
            .map_err(ApiError::BadRequest)?;
        Ok(TradeRequest {
            coin_id: CoinId(req.coin_id),
            side: req.side,
            amount: req.amount,
            order_type,
            notes: req.notes,
        })
    }
}

/// 提交订单
///
/// 市价单立即成交并返回 `completed` 订单；限价单与止损单以 `pending` 挂起。
#[utoipa::path(
    post,
    path = "/api/v1/trades",
    tag = "订单交易 (Trade)",
    security(("bearer_jwt" = [])),
    request_body = PlaceTradeRequest,
    responses(
        (status = 201, description = "订单已受理", body = ApiResponse<TradeResponse>),
        (status = 400, description = "参数无效、余额或持仓不足"),
        (status = 404, description = "币种不存在"),
        (status = 401, description = "未认证")
    )
)]
pub async fn place_trade(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
    ApiJson(req): ApiJson<PlaceTradeRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TradeResponse>>), ApiError> {
    let request = TradeRequest::try_from(req)?;
    let trade = state.trade_port.submit(&account.id, request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(trade.into()))))
}

/// 查询我的订单 (按创建时间倒序)
#[utoipa::path(
    get,
    path = "/api/v1/trades/my",
    tag = "订单交易 (Trade)",
    security(("bearer_jwt" = [])),
    params(TradeListQuery),
    responses(
        (status = 200, description = "订单列表", body = ApiResponse<TradeListResponse>),
        (status = 400, description = "筛选参数无效"),
        (status = 401, description = "未认证")
    )
)]
pub async fn my_trades(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
    ApiQuery(query): ApiQuery<TradeListQuery>,
) -> Result<Json<ApiResponse<TradeListResponse>>, ApiError> {
    let filter = TradeFilter {
        side: query
            .side
            .as_deref()
            .map(str::parse::<OrderSide>)
            .transpose()
            .map_err(ApiError::BadRequest)?,
        status: query
            .status
            .as_deref()
            .map(str::parse::<TradeStatus>)
            .transpose()
            .map_err(ApiError::BadRequest)?,
        coin_id: query.coin_id.map(CoinId),
    };
    let page = state
        .trade_port
        .list(&account.id, filter, PageRequest::new(query.page, query.limit))
        .await?;

    Ok(Json(ApiResponse::ok(TradeListResponse {
        trades: page.items.into_iter().map(Into::into).collect(),
        pagination: page.pagination,
    })))
}

/// 查询单个订单 (仅限本人)
#[utoipa::path(
    get,
    path = "/api/v1/trades/{id}",
    tag = "订单交易 (Trade)",
    security(("bearer_jwt" = [])),
    params(("id" = String, Path, description = "订单 ID")),
    responses(
        (status = 200, description = "订单详情", body = ApiResponse<TradeResponse>),
        (status = 403, description = "不是本人的订单"),
        (status = 404, description = "订单不存在")
    )
)]
pub async fn get_trade(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<ApiResponse<TradeResponse>>, ApiError> {
    let trade = state.trade_port.get(&account.id, &TradeId(id)).await?;
    Ok(Json(ApiResponse::ok(trade.into())))
}

/// 撤销挂单
///
/// 只有 `pending` 订单可以撤销。
#[utoipa::path(
    put,
    path = "/api/v1/trades/{id}/cancel",
    tag = "订单交易 (Trade)",
    security(("bearer_jwt" = [])),
    params(("id" = String, Path, description = "订单 ID")),
    responses(
        (status = 200, description = "订单已撤销", body = ApiResponse<TradeResponse>),
        (status = 400, description = "订单状态不允许撤销"),
        (status = 403, description = "不是本人的订单"),
        (status = 404, description = "订单不存在")
    )
)]
pub async fn cancel_trade(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<ApiResponse<TradeResponse>>, ApiError> {
    let trade = state.trade_port.cancel(&account.id, &TradeId(id)).await?;
    Ok(Json(ApiResponse::ok(trade.into())))
}

/// 已成交订单的买卖统计
#[utoipa::path(
    get,
    path = "/api/v1/trades/stats/summary",
    tag = "订单交易 (Trade)",
    security(("bearer_jwt" = [])),
    params(StatsQuery),
    responses(
        (status = 200, description = "交易统计", body = ApiResponse<TradeStatsResponse>),
        (status = 401, description = "未认证")
    )
)]
pub async fn trade_stats(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
    ApiQuery(query): ApiQuery<StatsQuery>,
) -> Result<Json<ApiResponse<TradeStatsResponse>>, ApiError> {
    let period = StatsPeriod::parse(query.period.as_deref().unwrap_or("all"));
    let stats = state.trade_port.stats(&account.id, period).await?;
    Ok(Json(ApiResponse::ok(stats.into())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn request(order_type: Option<&str>) -> PlaceTradeRequest {
        PlaceTradeRequest {
            coin_id: "c1".into(),
            side: OrderSide::Buy,
            amount: dec!(1),
            order_type: order_type.map(str::to_string),
            limit_price: None,
            stop_price: None,
            notes: None,
        }
    }

    #[test]
    fn test_order_type_defaults_to_market() {
        let req = TradeRequest::try_from(request(None)).unwrap();
        assert_eq!(req.order_type, OrderType::Market);
    }

    #[test]
    fn test_limit_without_price_is_rejected() {
        let err = TradeRequest::try_from(request(Some("limit"))).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));

        let mut with_price = request(Some("limit"));
        with_price.limit_price = Some(dec!(9.5));
        let req = TradeRequest::try_from(with_price).unwrap();
        assert_eq!(req.order_type, OrderType::Limit { limit_price: dec!(9.5) });
    }
}
