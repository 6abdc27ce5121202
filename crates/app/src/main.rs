use std::sync::Arc;

use config::{Config, Environment, File};
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use tripcoin_api::server::{AppState, start_server};
use tripcoin_core::common::time::{RealTimeProvider, TimeProvider};
use tripcoin_core::config::AppConfig;
use tripcoin_core::trade::port::TradePort;
use tripcoin_store::account::SqliteAccountStore;
use tripcoin_store::coin::SqliteCoinStore;
use tripcoin_store::db::Database;
use tripcoin_store::portfolio::SqlitePortfolioStore;
use tripcoin_store::settlement::SqliteSettlementStore;
use tripcoin_store::trade::SqliteTradeStore;
use tripcoin_trade::account::{AccountLedger, OpeningGrant};
use tripcoin_trade::catalog::CoinCatalog;
use tripcoin_trade::lock::AccountLocks;
use tripcoin_trade::portfolio::PortfolioService;
use tripcoin_trade::scheduler::MaintenanceJob;
use tripcoin_trade::service::{TradeService, TradeStores};

/// 加载配置: `config/default.toml` (可缺省) 之上叠加 `TRIPCOIN__` 前缀的环境变量
fn load_config() -> Result<AppConfig, config::ConfigError> {
    Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(Environment::with_prefix("TRIPCOIN").separator("__"))
        .build()?
        .try_deserialize()
}

/// # Summary
/// 应用启动入口，纯粹的 DI 容器。
/// 负责实例化所有具体实现组件，并通过 `Arc<dyn Trait>` 注入到服务层与 HTTP 层。
///
/// # Logic
/// 1. 初始化日志 (终端 + 按天滚动的文件)。
/// 2. 加载配置。
/// 3. 打开数据库，实例化各存储适配器。
/// 4. 构造账本、目录、组合与交易服务，它们共享同一张账户锁表。
/// 5. 启动定时维护任务与 HTTP 服务，收到 Ctrl+C 后优雅退出。
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. 初始化日志，guard 需存活到进程结束以保证缓冲刷盘
    let file_appender = tracing_appender::rolling::daily("logs", "tripcoin.log");
    let (file_writer, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .with(fmt::layer().with_writer(file_writer).with_ansi(false))
        .init();
    info!("Tripcoin starting...");

    // 2. 配置
    let app_config = Arc::new(load_config()?);

    // 3. 基础设施层
    let db = Database::open(&app_config.database.data_dir).await?;
    let accounts = Arc::new(SqliteAccountStore::new(&db));
    let coins = Arc::new(SqliteCoinStore::new(&db));
    let portfolio_store = Arc::new(SqlitePortfolioStore::new(&db));
    let trades = Arc::new(SqliteTradeStore::new(&db));
    let settlement = Arc::new(SqliteSettlementStore::new(&db));

    // 4. 服务层
    let clock: Arc<dyn TimeProvider> = Arc::new(RealTimeProvider);
    let locks = Arc::new(AccountLocks::new());
    let fee_rate = app_config.trading.fee_rate;

    let ledger = Arc::new(AccountLedger::new(
        accounts.clone(),
        locks.clone(),
        clock.clone(),
        OpeningGrant {
            balance: app_config.trading.initial_balance,
            points: app_config.loyalty.initial_points,
        },
    ));
    let catalog = Arc::new(CoinCatalog::new(coins.clone(), clock.clone()));
    let portfolios = Arc::new(PortfolioService::new(
        portfolio_store.clone(),
        coins.clone(),
        accounts.clone(),
        locks.clone(),
        clock.clone(),
        fee_rate,
    ));
    let trade_port: Arc<dyn TradePort> = Arc::new(TradeService::new(
        TradeStores {
            accounts,
            coins,
            portfolios: portfolio_store,
            trades,
            settlement,
        },
        locks,
        clock.clone(),
        fee_rate,
    ));

    // 5. 定时维护与 HTTP 服务
    let maintenance = MaintenanceJob::new(ledger.clone(), clock.clone()).spawn();

    let state = AppState {
        ledger,
        catalog,
        portfolios,
        trade_port,
        clock,
        app_config: app_config.clone(),
    };
    let bind_addr = format!("{}:{}", app_config.server.host, app_config.server.port);

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for shutdown signal: {}", e);
        }
        info!("Shutdown signal received. Exiting...");
    };
    start_server(state, &bind_addr, shutdown).await?;

    maintenance.abort();
    Ok(())
}
