//! # `tripcoin-trade` - 账本与交易服务
//!
//! 在 `tripcoin-core` 的端口之上实现积分账本、币种目录、投资组合和模拟交易结算，
//! 以及周期维护任务。所有账户级变更共享同一张 [`lock::AccountLocks`]。

pub mod account;
pub mod catalog;
pub mod lock;
pub mod matcher;
pub mod portfolio;
pub mod scheduler;
pub mod service;
