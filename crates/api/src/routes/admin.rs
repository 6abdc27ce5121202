//! # 管理员专有路由控制器
//!
//! 提供币种的新增与修改。
//! 对应的路由受 `auth_middleware` 和 `require_admin` 中间件验证保护。

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use tripcoin_core::catalog::entity::CoinId;

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::auth::CurrentUser;
use crate::server::AppState;
use crate::types::{ApiResponse, CoinResponse, CreateCoinRequest, UpdateCoinRequest};

/// 新增币种
///
/// 代码自动转为大写，重复代码返回 400。
#[utoipa::path(
    post,
    path = "/api/v1/coins",
    tag = "系统管理 (Admin)",
    security(("bearer_jwt" = [])),
    request_body = CreateCoinRequest,
    responses(
        (status = 201, description = "币种创建成功", body = ApiResponse<CoinResponse>),
        (status = 400, description = "无效的请求参数"),
        (status = 401, description = "未认证"),
        (status = 403, description = "无权限执行此操作")
    )
)]
pub async fn create_coin(
    State(state): State<AppState>,
    CurrentUser(admin): CurrentUser,
    ApiJson(req): ApiJson<CreateCoinRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CoinResponse>>), ApiError> {
    tracing::info!("Admin {} creating coin {}", admin.id, req.symbol);
    let coin = state.catalog.create(req.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(coin.into()))))
}

/// 部分更新币种
///
/// 现价发生变化时追加一条价格历史。
#[utoipa::path(
    put,
    path = "/api/v1/coins/{id}",
    tag = "系统管理 (Admin)",
    security(("bearer_jwt" = [])),
    params(("id" = String, Path, description = "币种 ID")),
    request_body = UpdateCoinRequest,
    responses(
        (status = 200, description = "币种已更新", body = ApiResponse<CoinResponse>),
        (status = 400, description = "无效的请求参数"),
        (status = 403, description = "无权限执行此操作"),
        (status = 404, description = "币种不存在")
    )
)]
pub async fn update_coin(
    State(state): State<AppState>,
    CurrentUser(admin): CurrentUser,
    ApiPath(id): ApiPath<String>,
    ApiJson(req): ApiJson<UpdateCoinRequest>,
) -> Result<Json<ApiResponse<CoinResponse>>, ApiError> {
    tracing::info!("Admin {} updating coin {}", admin.id, id);
    let coin = state.catalog.update(&CoinId(id), req.into()).await?;
    Ok(Json(ApiResponse::ok(coin.into())))
}
