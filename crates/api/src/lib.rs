//! # `tripcoin-api` - HTTP API 网关
//!
//! 本 crate 是 Tripcoin 积分与模拟交易平台的 HTTP/REST 服务入口。
//! 使用 `axum` 构建路由与控制器，通过 `utoipa` 自动生成 OpenAPI 3.0 Swagger 文档。
//!
//! ## 架构职责
//! - 接收前端的 HTTP 请求
//! - 执行 JWT 鉴权 (或钱包地址识别) 后分发至用户 / 管理员路由组
//! - 调用下层 `AccountLedger`、`CoinCatalog`、`PortfolioService` 与 `TradePort` 完成业务操作
//! - 将领域模型转换为 DTO 返回给前端

pub mod types;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
pub mod server;
