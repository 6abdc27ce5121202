use thiserror::Error;

use crate::store::error::StoreError;

/// # Summary
/// 币种目录操作错误。
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("币种不存在: {0}")]
    NotFound(String),
    #[error("参数校验失败: {0}")]
    Validation(String),
    #[error("内部系统错误: {0}")]
    Internal(String),
}

impl From<StoreError> for CatalogError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(msg) => CatalogError::Validation(format!("币种代码已存在: {}", msg)),
            other => CatalogError::Internal(other.to_string()),
        }
    }
}
