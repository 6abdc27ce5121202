use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;
use tripcoin_core::catalog::entity::{
    Coin, CoinId, CoinQuery, CoinUpdate, HistoryPeriod, NewCoin, PricePoint, TrendingKind,
    normalize_symbol,
};
use tripcoin_core::catalog::error::CatalogError;
use tripcoin_core::catalog::port::CoinStore;
use tripcoin_core::common::time::TimeProvider;
use tripcoin_core::common::{Page, PageRequest};

/// # Summary
/// 币种目录服务: 只读查询以及管理员的新增与更新。
pub struct CoinCatalog {
    store: Arc<dyn CoinStore>,
    clock: Arc<dyn TimeProvider>,
}

fn ensure_non_negative(field: &str, value: Decimal) -> Result<(), CatalogError> {
    if value < Decimal::ZERO {
        return Err(CatalogError::Validation(format!("{} must not be negative", field)));
    }
    Ok(())
}

impl CoinCatalog {
    pub fn new(store: Arc<dyn CoinStore>, clock: Arc<dyn TimeProvider>) -> Self {
        Self { store, clock }
    }

    pub async fn list(&self, query: &CoinQuery, page: PageRequest) -> Result<Page<Coin>, CatalogError> {
        Ok(self.store.list(query, page).await?)
    }

    pub async fn get(&self, id: &CoinId) -> Result<Coin, CatalogError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(id.0.clone()))
    }

    pub async fn get_by_symbol(&self, symbol: &str) -> Result<Coin, CatalogError> {
        self.store
            .find_by_symbol(symbol)
            .await?
            .ok_or_else(|| CatalogError::NotFound(symbol.to_string()))
    }

    pub async fn popular(&self, limit: u32) -> Result<Vec<Coin>, CatalogError> {
        Ok(self.store.popular(limit).await?)
    }

    pub async fn trending(&self, kind: TrendingKind, limit: u32) -> Result<Vec<Coin>, CatalogError> {
        Ok(self.store.trending(kind, limit).await?)
    }

    pub async fn search(&self, query: &str, limit: u32) -> Result<Vec<Coin>, CatalogError> {
        Ok(self.store.search(query, limit).await?)
    }

    /// 读取币种及其在窗口内的价格历史
    pub async fn price_history(
        &self,
        id: &CoinId,
        period: HistoryPeriod,
    ) -> Result<(Coin, Vec<PricePoint>), CatalogError> {
        let coin = self.get(id).await?;
        let history = self
            .store
            .price_history(id, period.cutoff(self.clock.now()))
            .await?;
        Ok((coin, history))
    }

    /// # Summary
    /// 新增币种。
    ///
    /// # Logic
    /// 1. 代码规范化为大写，名称与代码不可为空。
    /// 2. 价格、市值、成交量不可为负。
    /// 3. 写入币种及首条价格历史，代码重复返回校验错误。
    pub async fn create(&self, input: NewCoin) -> Result<Coin, CatalogError> {
        let symbol = normalize_symbol(&input.symbol);
        let name = input.name.trim().to_string();
        if symbol.is_empty() || name.is_empty() {
            return Err(CatalogError::Validation("symbol and name are required".into()));
        }
        ensure_non_negative("currentPrice", input.current_price)?;
        ensure_non_negative("marketCap", input.market_cap)?;
        ensure_non_negative("volume24h", input.volume_24h)?;

        let now = self.clock.now();
        let coin = Coin {
            id: CoinId(uuid::Uuid::new_v4().to_string()),
            symbol,
            name,
            current_price: input.current_price,
            market_cap: input.market_cap,
            volume_24h: input.volume_24h,
            price_change_24h: input.price_change_24h,
            price_change_percentage_24h: input.price_change_percentage_24h,
            high_24h: input.high_24h,
            low_24h: input.low_24h,
            circulating_supply: input.circulating_supply,
            total_supply: input.total_supply,
            max_supply: input.max_supply,
            image: input.image,
            description: input.description,
            website: input.website,
            whitepaper: input.whitepaper,
            is_active: true,
            category: input.category,
            created_at: now,
            updated_at: now,
        };
        self.store.insert(&coin).await?;
        info!("Coin {} ({}) created at {}", coin.symbol, coin.id, coin.current_price);
        Ok(coin)
    }

    /// # Summary
    /// 部分更新币种，现价变化时同一事务内追加价格历史。
    pub async fn update(&self, id: &CoinId, update: CoinUpdate) -> Result<Coin, CatalogError> {
        for (field, value) in [
            ("currentPrice", update.current_price),
            ("marketCap", update.market_cap),
            ("volume24h", update.volume_24h),
        ] {
            if let Some(v) = value {
                ensure_non_negative(field, v)?;
            }
        }
        if let Some(name) = &update.name
            && name.trim().is_empty()
        {
            return Err(CatalogError::Validation("name must not be empty".into()));
        }

        let mut coin = self.get(id).await?;
        let now = self.clock.now();
        let sample = update
            .apply(&mut coin, now)
            .map(|price| PricePoint { price, timestamp: now });
        self.store.save(&coin, sample).await?;
        info!("Coin {} updated", coin.symbol);
        Ok(coin)
    }
}
