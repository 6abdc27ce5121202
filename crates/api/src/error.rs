//! # API 统一错误处理
//!
//! 将下层各 crate 的错误类型统一映射到 HTTP 状态码与 JSON 响应体。

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tripcoin_core::account::error::AccountError;
use tripcoin_core::catalog::error::CatalogError;
use tripcoin_core::portfolio::entity::PortfolioError;
use tripcoin_core::trade::port::TradeError;

use crate::types::ApiErrorResponse;

/// API 层统一错误枚举
#[derive(Error, Debug)]
pub enum ApiError {
    /// 认证失败 (401)
    #[error("认证失败: {0}")]
    Unauthorized(String),

    /// 权限不足 (403)
    #[error("权限不足: {0}")]
    Forbidden(String),

    /// 资源未找到 (404)
    #[error("资源未找到: {0}")]
    NotFound(String),

    /// 请求参数错误 (400)
    #[error("请求参数错误: {0}")]
    BadRequest(String),

    /// 下层业务错误 (500)
    #[error("内部服务错误: {0}")]
    Internal(String),
}

/// 将 `ApiError` 转换为 axum 的 HTTP 响应
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => {
                // 内部错误只记录日志，不向客户端透传细节
                tracing::error!("内部服务错误: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "服务器内部错误".to_string(),
                )
            }
        };

        let body = Json(ApiErrorResponse::from_msg(message));
        (status, body).into_response()
    }
}

impl From<TradeError> for ApiError {
    fn from(err: TradeError) -> Self {
        match err {
            TradeError::AccountNotFound(_)
            | TradeError::CoinNotFound(_)
            | TradeError::TradeNotFound(_) => ApiError::NotFound(err.to_string()),
            TradeError::Forbidden => ApiError::Forbidden(err.to_string()),
            TradeError::Validation(_)
            | TradeError::InsufficientFunds { .. }
            | TradeError::InsufficientHoldings { .. }
            | TradeError::InvalidState(_) => ApiError::BadRequest(err.to_string()),
            TradeError::InternalError(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::NotFound(_) => ApiError::NotFound(err.to_string()),
            AccountError::Store(e) => ApiError::Internal(e.to_string()),
            AccountError::InvalidAmount(_)
            | AccountError::InsufficientFunds { .. }
            | AccountError::MissionAlreadyCompleted(_)
            | AccountError::Validation(_) => ApiError::BadRequest(err.to_string()),
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(_) => ApiError::NotFound(err.to_string()),
            CatalogError::Validation(_) => ApiError::BadRequest(err.to_string()),
            CatalogError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<PortfolioError> for ApiError {
    fn from(err: PortfolioError) -> Self {
        match err {
            PortfolioError::PortfolioNotFound(_)
            | PortfolioError::AccountNotFound(_)
            | PortfolioError::CoinNotFound(_) => ApiError::NotFound(err.to_string()),
            PortfolioError::Internal(msg) => ApiError::Internal(msg),
            PortfolioError::InsufficientHoldings { .. }
            | PortfolioError::InvalidAmount(_)
            | PortfolioError::InvalidPrice(_)
            | PortfolioError::InsufficientFunds { .. } => ApiError::BadRequest(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_trade_errors_map_to_status_classes() {
        let cases = [
            (TradeError::Forbidden, StatusCode::FORBIDDEN),
            (TradeError::TradeNotFound("t".into()), StatusCode::NOT_FOUND),
            (TradeError::InvalidState("done".into()), StatusCode::BAD_REQUEST),
            (
                TradeError::InsufficientFunds {
                    required: Decimal::ONE,
                    actual: Decimal::ZERO,
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                TradeError::InternalError("db".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            let response = ApiError::from(err).into_response();
            assert_eq!(response.status(), status);
        }
    }

    #[test]
    fn test_account_store_failure_is_internal() {
        let err = AccountError::Store(tripcoin_core::store::error::StoreError::Database("x".into()));
        assert!(matches!(ApiError::from(err), ApiError::Internal(_)));
    }
}
