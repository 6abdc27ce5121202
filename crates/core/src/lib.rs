//! # `tripcoin-core` - 领域核心
//!
//! 定义积分账户、币种目录、持仓组合与交易订单的实体、端口 (Port) 与错误类型。
//! 本 crate 不依赖任何具体的存储或 Web 框架，下游 crate 通过实现这里的 Trait 完成注入。

pub mod account;
pub mod catalog;
pub mod common;
pub mod config;
pub mod portfolio;
pub mod store;
pub mod trade;
