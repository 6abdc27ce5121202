//! # 用户积分路由控制器
//!
//! 以 `x-user-address` 请求头标识钱包用户，提供资料查询、任务完成、积分增减与排行榜。

use axum::Json;
use axum::extract::State;
use rust_decimal::Decimal;

use tripcoin_core::account::entity::PointKind;

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiQuery};
use crate::middleware::auth::WalletAddress;
use crate::server::AppState;
use crate::types::{
    ApiResponse, CompleteMissionRequest, LimitQuery, MissionResponse, PointsRequest,
    PointsResponse, RankingsResponse, UserResponse,
};

const DEFAULT_RANKING_LIMIT: u32 = 10;
const MAX_RANKING_LIMIT: u32 = 100;

/// 按钱包地址查询用户，首次访问自动开户
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "用户 (Users)",
    params(("x-user-address" = String, Header, description = "钱包地址")),
    responses(
        (status = 200, description = "用户资料", body = ApiResponse<UserResponse>),
        (status = 400, description = "缺少钱包地址")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    WalletAddress(address): WalletAddress,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let account = state.ledger.find_or_open_by_wallet(&address).await?;
    Ok(Json(ApiResponse::ok(account.into())))
}

/// 完成任务并发放奖励积分
#[utoipa::path(
    post,
    path = "/api/v1/users/missions/complete",
    tag = "用户 (Users)",
    params(("x-user-address" = String, Header, description = "钱包地址")),
    request_body = CompleteMissionRequest,
    responses(
        (status = 200, description = "任务已完成", body = ApiResponse<MissionResponse>),
        (status = 400, description = "任务无效或已完成"),
        (status = 404, description = "用户不存在")
    )
)]
pub async fn complete_mission(
    State(state): State<AppState>,
    WalletAddress(address): WalletAddress,
    ApiJson(req): ApiJson<CompleteMissionRequest>,
) -> Result<Json<ApiResponse<MissionResponse>>, ApiError> {
    if req.mission_id.trim().is_empty() {
        return Err(ApiError::BadRequest("missionId is required".into()));
    }
    let points = req.points.unwrap_or(Decimal::ZERO);
    let account = state.ledger.find_by_wallet(&address).await?;
    let account = state
        .ledger
        .complete_mission(&account.id, req.mission_id.trim(), points)
        .await?;

    Ok(Json(ApiResponse::ok(MissionResponse {
        mission_id: req.mission_id,
        points,
        user: account.into(),
    })))
}

/// 增加积分
#[utoipa::path(
    post,
    path = "/api/v1/users/points/add",
    tag = "用户 (Users)",
    params(("x-user-address" = String, Header, description = "钱包地址")),
    request_body = PointsRequest,
    responses(
        (status = 200, description = "积分已增加", body = ApiResponse<PointsResponse>),
        (status = 400, description = "金额无效"),
        (status = 404, description = "用户不存在")
    )
)]
pub async fn add_points(
    State(state): State<AppState>,
    WalletAddress(address): WalletAddress,
    ApiJson(req): ApiJson<PointsRequest>,
) -> Result<Json<ApiResponse<PointsResponse>>, ApiError> {
    let kind = req.kind.unwrap_or_default();
    let account = state.ledger.find_by_wallet(&address).await?;
    let account = state.ledger.credit(&account.id, req.amount, kind).await?;
    Ok(Json(ApiResponse::ok(points_response(account, kind))))
}

/// 使用积分
#[utoipa::path(
    post,
    path = "/api/v1/users/points/use",
    tag = "用户 (Users)",
    params(("x-user-address" = String, Header, description = "钱包地址")),
    request_body = PointsRequest,
    responses(
        (status = 200, description = "积分已扣减", body = ApiResponse<PointsResponse>),
        (status = 400, description = "金额无效或积分不足"),
        (status = 404, description = "用户不存在")
    )
)]
pub async fn use_points(
    State(state): State<AppState>,
    WalletAddress(address): WalletAddress,
    ApiJson(req): ApiJson<PointsRequest>,
) -> Result<Json<ApiResponse<PointsResponse>>, ApiError> {
    let kind = req.kind.unwrap_or_default();
    let account = state.ledger.find_by_wallet(&address).await?;
    let account = state.ledger.debit(&account.id, req.amount, kind).await?;
    Ok(Json(ApiResponse::ok(points_response(account, kind))))
}

fn points_response(account: tripcoin_core::account::entity::Account, kind: PointKind) -> PointsResponse {
    let new_balance = match kind {
        PointKind::Point => account.point,
        PointKind::Svt => account.svt_point,
    };
    PointsResponse {
        new_balance,
        user: account.into(),
    }
}

/// 积分排行榜 (活跃用户，按普通积分、代币积分降序)
#[utoipa::path(
    get,
    path = "/api/v1/users/rankings",
    tag = "用户 (Users)",
    params(LimitQuery),
    responses(
        (status = 200, description = "排行榜", body = ApiResponse<RankingsResponse>)
    )
)]
pub async fn rankings(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<LimitQuery>,
) -> Result<Json<ApiResponse<RankingsResponse>>, ApiError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_RANKING_LIMIT)
        .clamp(1, MAX_RANKING_LIMIT);
    let accounts = state.ledger.rankings(limit).await?;
    Ok(Json(ApiResponse::ok(RankingsResponse::from_accounts(accounts))))
}
