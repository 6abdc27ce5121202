//! # API 服务启动器
//!
//! 组装 axum 路由、挂载 Swagger UI、配置 CORS 与请求追踪并绑定 TCP 端口对外提供服务。
//! 本模块不直接启动 `main()`, 而是由 `crates/app` 的 DI 容器持有并调用。

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use utoipa_swagger_ui::SwaggerUi;

use tripcoin_core::common::time::TimeProvider;
use tripcoin_core::config::AppConfig;
use tripcoin_core::trade::port::TradePort;
use tripcoin_trade::account::AccountLedger;
use tripcoin_trade::catalog::CoinCatalog;
use tripcoin_trade::portfolio::PortfolioService;

use crate::routes::{admin, auth, coins, portfolio, trade, users};

// ============================================================
//  共享应用状态
// ============================================================

/// 全局应用状态，通过 axum 的 `State` 提取器注入到每个 Handler 中。
///
/// # Invariants
/// - 所有服务在服务启动前由 DI 容器注入，生命周期与进程等同。
/// - `ledger`、`portfolios` 与 `trade_port` 共享同一张账户锁表。
#[derive(Clone)]
pub struct AppState {
    /// 积分账本
    pub ledger: Arc<AccountLedger>,
    /// 币种目录
    pub catalog: Arc<CoinCatalog>,
    /// 投资组合服务
    pub portfolios: Arc<PortfolioService>,
    /// 交易服务端口
    pub trade_port: Arc<dyn TradePort>,
    /// 时钟 (用于签发令牌)
    pub clock: Arc<dyn TimeProvider>,
    pub app_config: Arc<AppConfig>,
}

// ============================================================
//  OpenAPI 文档定义
// ============================================================

/// 全局 OpenAPI 文档结构
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tripcoin API",
        version = "0.1.0",
        description = "区域旅游积分平台与模拟币种交易的 RESTful API。提供积分账本、任务、币种目录、模拟交易与投资组合功能。",
        license(name = "MIT")
    ),
    tags(
        (name = "鉴权 (Auth)", description = "Google 登录与 JWT 相关API"),
        (name = "用户 (Users)", description = "钱包用户的积分、任务与排行榜"),
        (name = "币种 (Coins)", description = "币种目录、涨跌榜与价格历史"),
        (name = "订单交易 (Trade)", description = "模拟下单、撤单与交易统计"),
        (name = "投资组合 (Portfolio)", description = "持仓估值、统计、公开组合与回测"),
        (name = "系统管理 (Admin)", description = "币种新增与维护")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// 为 OpenAPI 文档注入全局 Bearer JWT 鉴权方案。
///
/// 注册后，Swagger UI 页面顶部将显示 Authorize 按钮，
/// 用户可以填入 JWT Token 后对所有标记了 `security` 的接口进行鉴权测试。
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);

        components.add_security_scheme(
            "bearer_jwt",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some(
                        "在此处填入登录接口返回的 JWT Token（无需 'Bearer ' 前缀）",
                    ))
                    .build(),
            ),
        );
    }
}

// ============================================================
//  服务构建与启动
// ============================================================

/// # Summary
/// 构建完整的 axum 应用路由树 (含 Swagger UI、CORS 与请求追踪)。
///
/// # Logic
/// 1. 公开路由: 登录、钱包用户、币种查询、公开组合。
/// 2. 用户路由: 需要合法 JWT。
/// 3. 管理员路由: 需要 JWT 且角色为 admin。
pub fn build_router(state: AppState) -> Router {
    let public_router = OpenApiRouter::new()
        .routes(routes!(auth::google_login))
        .routes(routes!(users::get_user))
        .routes(routes!(users::complete_mission))
        .routes(routes!(users::add_points))
        .routes(routes!(users::use_points))
        .routes(routes!(users::rankings))
        .routes(routes!(coins::list_coins))
        .routes(routes!(coins::get_coin))
        .routes(routes!(coins::get_coin_by_symbol))
        .routes(routes!(coins::popular_coins))
        .routes(routes!(coins::trending_coins))
        .routes(routes!(coins::price_history))
        .routes(routes!(coins::search_coins))
        .routes(routes!(portfolio::public_portfolios))
        .routes(routes!(portfolio::user_portfolio));

    let user_protected_router = OpenApiRouter::new()
        .routes(routes!(auth::me))
        .routes(routes!(auth::logout))
        .routes(routes!(trade::place_trade))
        .routes(routes!(trade::my_trades))
        .routes(routes!(trade::get_trade))
        .routes(routes!(trade::cancel_trade))
        .routes(routes!(trade::trade_stats))
        .routes(routes!(portfolio::my_portfolio))
        .routes(routes!(portfolio::my_portfolio_detailed))
        .routes(routes!(portfolio::my_portfolio_stats))
        .routes(routes!(portfolio::update_settings))
        .routes(routes!(portfolio::backtest))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::auth::auth_middleware,
        ));

    let admin_protected_router = OpenApiRouter::new()
        .routes(routes!(admin::create_coin))
        .routes(routes!(admin::update_coin))
        .layer(axum::middleware::from_fn(
            crate::middleware::auth::require_admin,
        ))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::auth::auth_middleware,
        ));

    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(public_router)
        .merge(user_protected_router)
        .merge(admin_protected_router)
        .with_state(state)
        .split_for_parts();

    // 开发阶段允许所有来源
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// 构建路由树并启动 HTTP 监听。
///
/// # Arguments
/// * `state` - 由外部 DI 容器注入的共享状态
/// * `bind_addr` - 监听的地址与端口，如 `"0.0.0.0:5000"`
/// * `shutdown` - 完成时触发优雅停机的信号
pub async fn start_server(
    state: AppState,
    bind_addr: &str,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = build_router(state);

    tracing::info!("Tripcoin API Server listening on {}", bind_addr);
    tracing::info!("Swagger UI: http://{}/swagger-ui/", bind_addr);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
