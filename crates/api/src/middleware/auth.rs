//! # 鉴权中间件
//!
//! 提供基于 JWT 的身份验证、管理员角色校验，以及钱包地址请求头提取。

use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use chrono::{DateTime, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use tripcoin_core::account::entity::{Account, AccountId, UserRole};
use tripcoin_core::account::error::AccountError;

use crate::error::ApiError;
use crate::server::AppState;
use crate::types::Claims;

/// 钱包地址请求头
pub const WALLET_HEADER: &str = "x-user-address";

/// 提取并验证 Authorization: Bearer <token>，将调用者账户注入 request extensions
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = match req.headers().get(axum::http::header::AUTHORIZATION) {
        Some(header_val) => {
            let s = header_val
                .to_str()
                .map_err(|_| ApiError::Unauthorized("Invalid auth header".into()))?;
            match s.strip_prefix("Bearer ") {
                Some(t) => t.to_string(),
                None => {
                    tracing::warn!("Invalid Bearer format");
                    return Err(ApiError::Unauthorized("Invalid Bearer format".into()));
                }
            }
        }
        None => {
            tracing::warn!("Missing Authorization header");
            return Err(ApiError::Unauthorized("Missing Authorization header".into()));
        }
    };

    let claims = verify_jwt(&token, &state.app_config.server.jwt_secret)
        .inspect_err(|e| tracing::warn!("JWT verification failed: {}", e))?;

    let account = match state.ledger.get(&AccountId(claims.sub.clone())).await {
        Ok(a) => a,
        Err(AccountError::NotFound(_)) => {
            return Err(ApiError::Unauthorized("User not found".into()));
        }
        Err(e) => return Err(e.into()),
    };
    if !account.is_active {
        return Err(ApiError::Forbidden("Account is disabled".into()));
    }

    req.extensions_mut().insert(account);
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Admin 级别权限校验中间件
/// 必须在 `auth_middleware` 之后应用！
pub async fn require_admin(req: Request, next: Next) -> Result<Response, ApiError> {
    let account = req
        .extensions()
        .get::<Account>()
        .ok_or_else(|| ApiError::Unauthorized("User context not found".into()))?;

    if account.role != UserRole::Admin {
        return Err(ApiError::Forbidden("Admin privileges required".into()));
    }

    Ok(next.run(req).await)
}

/// # Summary
/// 为账户签发 HS256 JWT。
///
/// # Returns
/// `exp` 为 `now + expires_in_secs` 的令牌字符串。
pub fn issue_jwt(
    account: &Account,
    secret: &str,
    expires_in_secs: u64,
    now: DateTime<Utc>,
) -> Result<String, ApiError> {
    let issued_at = u64::try_from(now.timestamp())
        .map_err(|_| ApiError::Internal("Clock is before the Unix epoch".into()))?;
    let claims = Claims {
        sub: account.id.0.clone(),
        role: account.role.to_string(),
        exp: issued_at.saturating_add(expires_in_secs),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| ApiError::Internal("Failed to generate token".into()))
}

/// 验证 JWT 返回强类型 Claims
pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims, ApiError> {
    let mut validation = Validation::default();
    validation.set_required_spec_claims(&["exp", "sub"]);

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|_| ApiError::Unauthorized("Invalid or expired token".into()))?;

    Ok(token_data.claims)
}

/// 在提取器中获取当前用户的快捷方式
pub struct CurrentUser(pub Account);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let account = parts
            .extensions
            .get::<Account>()
            .cloned()
            .ok_or_else(|| ApiError::Unauthorized("Missing User Context".into()))?;
        Ok(CurrentUser(account))
    }
}

/// 从 `x-user-address` 请求头提取钱包地址，缺失或为空时返回 400
pub struct WalletAddress(pub String);

impl<S> FromRequestParts<S> for WalletAddress
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let address = parts
            .headers
            .get(WALLET_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ApiError::BadRequest("Wallet address header is required".into()))?;
        Ok(WalletAddress(address.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn account() -> Account {
        Account::new(
            AccountId("acct-1".into()),
            "tester".into(),
            Decimal::ZERO,
            Decimal::ZERO,
            Utc::now(),
        )
    }

    #[test]
    fn test_issued_token_round_trips() {
        let token = issue_jwt(&account(), "secret", 3600, Utc::now()).unwrap();
        let claims = verify_jwt(&token, "secret").unwrap();
        assert_eq!(claims.sub, "acct-1");
        assert_eq!(claims.role, "user");
    }

    #[test]
    fn test_wrong_secret_and_expired_token_are_rejected() {
        let token = issue_jwt(&account(), "secret", 3600, Utc::now()).unwrap();
        assert!(matches!(
            verify_jwt(&token, "other"),
            Err(ApiError::Unauthorized(_))
        ));

        let stale = issue_jwt(
            &account(),
            "secret",
            60,
            Utc::now() - chrono::Duration::days(1),
        )
        .unwrap();
        assert!(matches!(
            verify_jwt(&stale, "secret"),
            Err(ApiError::Unauthorized(_))
        ));
    }
}
