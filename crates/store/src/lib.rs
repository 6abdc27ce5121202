//! # `tripcoin-store` - SQLite 存储适配器
//!
//! 为 `tripcoin-core` 中的各个存储端口提供基于 `sqlx` 的实现。
//! 所有适配器共享 [`db::Database`] 打开的同一个 `app.db` 连接池。

pub mod account;
pub mod coin;
pub mod db;
pub mod portfolio;
pub mod settlement;
pub mod trade;
