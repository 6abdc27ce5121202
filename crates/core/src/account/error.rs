use rust_decimal::Decimal;
use thiserror::Error;

use crate::store::error::StoreError;

/// # Summary
/// 账户账本操作中可能发生的错误。
#[derive(Error, Debug)]
pub enum AccountError {
    #[error("账户不存在: {0}")]
    NotFound(String),
    #[error("金额必须为正数: {0}")]
    InvalidAmount(Decimal),
    #[error("余额不足. 需要: {required}, 实际: {actual}")]
    InsufficientFunds { required: Decimal, actual: Decimal },
    #[error("任务已完成: {0}")]
    MissionAlreadyCompleted(String),
    #[error("参数校验失败: {0}")]
    Validation(String),
    #[error("存储错误: {0}")]
    Store(#[from] StoreError),
}
