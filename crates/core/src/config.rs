use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// 全局应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub trading: TradingConfig,
    pub loyalty: LoyaltyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    /// 颁发的 JWT 有效期 (秒)
    pub jwt_expires_in_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub data_dir: String,
}

/// 模拟交易参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingConfig {
    /// 单边手续费率，按成交额收取
    pub fee_rate: Decimal,
    /// 新开账户的初始现金余额
    pub initial_balance: Decimal,
}

/// 积分体系参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoyaltyConfig {
    /// 新开账户赠送的普通积分
    pub initial_points: Decimal,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            trading: TradingConfig::default(),
            loyalty: LoyaltyConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            jwt_secret: "YOUR_SUPER_SECRET_KEY".to_string(), // Default for dev, should be overwritten by config
            jwt_expires_in_secs: 86400,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
        }
    }
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            fee_rate: dec!(0.001),
            initial_balance: dec!(1000000),
        }
    }
}

impl Default for LoyaltyConfig {
    fn default() -> Self {
        Self {
            initial_points: dec!(100),
        }
    }
}
