use chrono::Utc;
use reqwest::StatusCode;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::net::TcpListener;

use tripcoin_api::middleware::auth::issue_jwt;
use tripcoin_api::server::{AppState, build_router};
use tripcoin_api::types::{ApiResponse, LoginResponse, TradeResponse};
use tripcoin_core::account::entity::{Account, AccountId, UserRole};
use tripcoin_core::account::port::AccountStore;
use tripcoin_core::common::time::RealTimeProvider;
use tripcoin_core::config::AppConfig;
use tripcoin_core::trade::entity::TradeStatus;
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
use tripcoin_trade::service::{TradeService, TradeStores};

struct TestServer {
    base_url: String,
    admin_token: String,
    _tmp: tempfile::TempDir,
}

// 帮助函数：在随机端口启动测试服务器，并预置一个管理员账户
async fn spawn_test_server() -> TestServer {
    // reqwest 使用 rustls-no-provider，需要进程级的加密后端
    let _provider = rustls::crypto::ring::default_provider().install_default();
    let tmp = tempfile::tempdir().expect("Failed to create temp dir");
    let db = Database::open(tmp.path()).await.unwrap();
    let config = Arc::new(AppConfig::default());
    let clock = Arc::new(RealTimeProvider);
    let locks = Arc::new(AccountLocks::new());

    let accounts = Arc::new(SqliteAccountStore::new(&db));
    let coins = Arc::new(SqliteCoinStore::new(&db));
    let portfolio_store = Arc::new(SqlitePortfolioStore::new(&db));

    let admin = {
        let mut a = Account::new(
            AccountId("admin".into()),
            "admin".into(),
            Decimal::ZERO,
            Decimal::ZERO,
            Utc::now(),
        );
        a.role = UserRole::Admin;
        a
    };
    accounts.insert(&admin).await.unwrap();
    let admin_token = issue_jwt(&admin, &config.server.jwt_secret, 3600, Utc::now()).unwrap();

    let fee_rate = config.trading.fee_rate;
    let state = AppState {
        ledger: Arc::new(AccountLedger::new(
            accounts.clone(),
            locks.clone(),
            clock.clone(),
            OpeningGrant {
                balance: config.trading.initial_balance,
                points: config.loyalty.initial_points,
            },
        )),
        catalog: Arc::new(CoinCatalog::new(coins.clone(), clock.clone())),
        portfolios: Arc::new(PortfolioService::new(
            portfolio_store.clone(),
            coins.clone(),
            accounts.clone(),
            locks.clone(),
            clock.clone(),
            fee_rate,
        )),
        trade_port: Arc::new(TradeService::new(
            TradeStores {
                accounts,
                coins,
                portfolios: portfolio_store,
                trades: Arc::new(SqliteTradeStore::new(&db)),
                settlement: Arc::new(SqliteSettlementStore::new(&db)),
            },
            locks,
            clock.clone(),
            fee_rate,
        )),
        clock,
        app_config: config,
    };

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let router = build_router(state);
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestServer {
        base_url: format!("http://127.0.0.1:{}", port),
        admin_token,
        _tmp: tmp,
    }
}

fn num(v: &Value) -> f64 {
    v.as_f64().unwrap()
}

#[tokio::test]
async fn test_trading_workflow() {
    let _ = tracing_subscriber::fmt().with_env_filter("debug").try_init();

    let server = spawn_test_server().await;
    let base = &server.base_url;
    let client = reqwest::Client::new();

    // ============================================
    // Case 1: 无效的 Google Token
    // ============================================
    let res = client
        .post(format!("{}/api/v1/auth/google", base))
        .json(&json!({"id_token": "short"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // ============================================
    // Case 2: Google 登录开户，同一 Token 再次登录得到同一账户
    // ============================================
    let res = client
        .post(format!("{}/api/v1/auth/google", base))
        .json(&json!({"id_token": "google-id-token-0001"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let login: ApiResponse<LoginResponse> = res.json().await.unwrap();
    let login = login.data.unwrap();
    assert_eq!(login.user.balance, dec!(1000000));
    assert_eq!(login.user.point, dec!(100));
    let token = login.token;

    let again: ApiResponse<LoginResponse> = client
        .post(format!("{}/api/v1/auth/google", base))
        .json(&json!({"id_token": "google-id-token-0001"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(again.data.unwrap().user.id, login.user.id);

    let res = client.get(format!("{}/api/v1/auth/me", base)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let me: Value = client
        .get(format!("{}/api/v1/auth/me", base))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(me["data"]["id"], json!(login.user.id));

    // ============================================
    // Case 3: 新增币种仅限管理员
    // ============================================
    let new_coin = json!({"symbol": "jeju", "name": "Jeju Coin", "currentPrice": 10, "marketCap": 5000});
    let res = client
        .post(format!("{}/api/v1/coins", base))
        .bearer_auth(&token)
        .json(&new_coin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .post(format!("{}/api/v1/coins", base))
        .bearer_auth(&server.admin_token)
        .json(&new_coin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await.unwrap();
    assert_eq!(created["data"]["symbol"], "JEJU");
    let coin_id = created["data"]["id"].as_str().unwrap().to_string();

    let by_symbol: Value = client
        .get(format!("{}/api/v1/coins/symbol/jeju", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(by_symbol["data"]["id"], json!(coin_id));

    let list: Value = client
        .get(format!("{}/api/v1/coins?sort=marketCap&order=desc", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list["data"]["pagination"]["totalItems"], 1);

    // ============================================
    // Case 4: 市价买入，余额不足的买单被拒绝
    // ============================================
    let res = client
        .post(format!("{}/api/v1/trades", base))
        .bearer_auth(&token)
        .json(&json!({"coinId": coin_id, "type": "buy", "amount": 50}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let buy: ApiResponse<TradeResponse> = res.json().await.unwrap();
    let buy = buy.data.unwrap();
    assert_eq!(buy.status, TradeStatus::Completed);
    assert_eq!(buy.total_value, dec!(500));
    assert_eq!(buy.fee, dec!(0.5));

    let res = client
        .post(format!("{}/api/v1/trades", base))
        .bearer_auth(&token)
        .json(&json!({"coinId": coin_id, "type": "buy", "amount": 1000000}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // 非法的交易方向与损坏的请求体同样返回 400 和统一错误结构
    let res = client
        .post(format!("{}/api/v1/trades", base))
        .bearer_auth(&token)
        .json(&json!({"coinId": coin_id, "type": "hold", "amount": 1, "orderType": "market"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());

    let res = client
        .post(format!("{}/api/v1/trades", base))
        .bearer_auth(&token)
        .header("content-type", "application/json")
        .body("{\"coinId\": ")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .get(format!("{}/api/v1/trades/my?page=abc", base))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);

    // ============================================
    // Case 5: 管理员调价后卖出，价格历史追加
    // ============================================
    let res = client
        .put(format!("{}/api/v1/coins/{}", base, coin_id))
        .bearer_auth(&server.admin_token)
        .json(&json!({"currentPrice": 12}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let history: Value = client
        .get(format!("{}/api/v1/coins/{}/price-history?period=24h", base, coin_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(history["data"]["history"].as_array().unwrap().len(), 2);

    let res = client
        .post(format!("{}/api/v1/trades", base))
        .bearer_auth(&token)
        .json(&json!({"coinId": coin_id, "type": "sell", "amount": 20, "orderType": "market"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let portfolio: Value = client
        .get(format!("{}/api/v1/portfolio/my", base))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let holding = &portfolio["data"]["holdings"][0];
    assert_eq!(num(&holding["amount"]), 30.0);
    assert_eq!(num(&holding["averageBuyPrice"]), 10.0);
    assert_eq!(num(&portfolio["data"]["totalValue"]), 360.0);
    assert_eq!(portfolio["data"]["profitStatus"], "profit");

    let me: Value = client
        .get(format!("{}/api/v1/auth/me", base))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    // 1000000 - 500.5 + 239.76
    assert!((num(&me["data"]["balance"]) - 999739.26).abs() < 1e-6);

    // ============================================
    // Case 6: 限价单挂起后撤销，重复撤销被拒绝
    // ============================================
    let res = client
        .post(format!("{}/api/v1/trades", base))
        .bearer_auth(&token)
        .json(&json!({"coinId": coin_id, "type": "buy", "amount": 5, "orderType": "limit"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST, "限价单缺少 limitPrice");

    let limit: ApiResponse<TradeResponse> = client
        .post(format!("{}/api/v1/trades", base))
        .bearer_auth(&token)
        .json(&json!({"coinId": coin_id, "type": "buy", "amount": 5, "orderType": "limit", "limitPrice": 9}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let limit = limit.data.unwrap();
    assert_eq!(limit.status, TradeStatus::Pending);

    let res = client
        .put(format!("{}/api/v1/trades/{}/cancel", base, limit.id))
        .bearer_auth(&server.admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .put(format!("{}/api/v1/trades/{}/cancel", base, limit.id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let res = client
        .put(format!("{}/api/v1/trades/{}/cancel", base, limit.id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let completed: Value = client
        .get(format!("{}/api/v1/trades/my?status=completed", base))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(completed["data"]["trades"].as_array().unwrap().len(), 2);

    let stats: Value = client
        .get(format!("{}/api/v1/trades/stats/summary?period=7d", base))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats["data"]["total"]["count"], 2);
    assert_eq!(stats["data"]["buy"]["count"], 1);
    assert_eq!(stats["data"]["period"], "7d");

    // ============================================
    // Case 7: 公开组合
    // ============================================
    let user_url = format!("{}/api/v1/portfolio/user/{}", base, login.user.id);
    let res = client.get(&user_url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .put(format!("{}/api/v1/portfolio/my/settings", base))
        .bearer_auth(&token)
        .json(&json!({"isPublic": true, "tags": ["jeju", "long"]}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let res = client.get(&user_url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let public: Value = client
        .get(format!("{}/api/v1/portfolio/public", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(public["data"]["portfolios"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_wallet_points_workflow() {
    let server = spawn_test_server().await;
    let base = &server.base_url;
    let client = reqwest::Client::new();

    let res = client.get(format!("{}/api/v1/users", base)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let user: Value = client
        .get(format!("{}/api/v1/users", base))
        .header("x-user-address", "0xWALLET")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(user["data"]["walletAddress"], "0xWALLET");
    assert_eq!(user["data"]["rank"], "bronze");

    let added: Value = client
        .post(format!("{}/api/v1/users/points/add", base))
        .header("x-user-address", "0xWALLET")
        .json(&json!({"amount": 50, "type": "SVT"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(num(&added["data"]["newBalance"]), 50.0);
    assert_eq!(num(&added["data"]["user"]["monthlyEarned"]), 50.0);

    let res = client
        .post(format!("{}/api/v1/users/points/use", base))
        .header("x-user-address", "0xWALLET")
        .json(&json!({"amount": 1000}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .post(format!("{}/api/v1/users/points/add", base))
        .header("x-user-address", "0xWALLET")
        .json(&json!({"amount": -5}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let mission: Value = client
        .post(format!("{}/api/v1/users/missions/complete", base))
        .header("x-user-address", "0xWALLET")
        .json(&json!({"missionId": "sns_share", "points": 20}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(mission["data"]["user"]["oneTimeMissionStatus"]["sns_share"], true);
    assert_eq!(num(&mission["data"]["user"]["point"]), 120.0);

    let res = client
        .post(format!("{}/api/v1/users/missions/complete", base))
        .header("x-user-address", "0xWALLET")
        .json(&json!({"missionId": "sns_share"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .post(format!("{}/api/v1/users/points/add", base))
        .header("x-user-address", "0xUNKNOWN")
        .json(&json!({"amount": 5}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let rankings: Value = client
        .get(format!("{}/api/v1/users/rankings?limit=5", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let first = &rankings["data"]["rankings"][0];
    assert_eq!(first["position"], 1);
    assert_eq!(num(&first["totalPoints"]), 170.0);

    let res = client
        .get(format!("{}/api-docs/openapi.json", base))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}
