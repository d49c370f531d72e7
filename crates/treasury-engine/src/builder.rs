//! Builder pattern for the spread engine.

use std::sync::Arc;

use tracing::info;

use treasury_ext_file::{CsvPriceSource, JsonPortfolioSource, JsonWhitelistSource};
use treasury_traits::cache::CacheStore;
use treasury_traits::portfolio::PortfolioSource;
use treasury_traits::prices::PriceSource;
use treasury_traits::whitelist::WhitelistSource;

use crate::cache::{CachedPortfolioSource, MemoryCacheStore};
use crate::config::EngineConfig;
use crate::engine::SpreadEngine;
use crate::error::{EngineError, EngineResult};

/// Builder for constructing a [`SpreadEngine`].
pub struct SpreadEngineBuilder {
    config: Option<EngineConfig>,
    portfolio: Option<Arc<dyn PortfolioSource>>,
    whitelist: Option<Arc<dyn WhitelistSource>>,
    prices: Option<Arc<dyn PriceSource>>,
    cache: Option<Arc<dyn CacheStore>>,
}

impl SpreadEngineBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            config: None,
            portfolio: None,
            whitelist: None,
            prices: None,
            cache: None,
        }
    }

    /// Set the engine configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the portfolio source.
    pub fn with_portfolio_source(mut self, source: Arc<dyn PortfolioSource>) -> Self {
        self.portfolio = Some(source);
        self
    }

    /// Set the whitelist source.
    pub fn with_whitelist_source(mut self, source: Arc<dyn WhitelistSource>) -> Self {
        self.whitelist = Some(source);
        self
    }

    /// Set the price source. Without one, prices come from the portfolio's
    /// quote windows.
    pub fn with_price_source(mut self, source: Arc<dyn PriceSource>) -> Self {
        self.prices = Some(source);
        self
    }

    /// Cache portfolio fetches in `cache`.
    pub fn with_cache(mut self, cache: Arc<dyn CacheStore>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Build the spread engine.
    pub fn build(self) -> EngineResult<SpreadEngine> {
        let config = self.config.unwrap_or_default();

        let portfolio = self
            .portfolio
            .ok_or_else(|| EngineError::ConfigError("portfolio source not configured".into()))?;

        let whitelist = self
            .whitelist
            .ok_or_else(|| EngineError::ConfigError("whitelist source not configured".into()))?;

        let portfolio: Arc<dyn PortfolioSource> = match self.cache {
            Some(cache) => Arc::new(CachedPortfolioSource::new(portfolio, cache)),
            None => portfolio,
        };

        Ok(SpreadEngine::new(config, portfolio, whitelist, self.prices))
    }
}

impl Default for SpreadEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Create an engine over the file sources named in `config`.
///
/// `portfolio_dir` and `whitelist_file` are required. Without `prices_file`
/// prices come from the portfolio's quote windows. Portfolio fetches are
/// cached in the redb file at `cache_path`, or in memory when it is unset; a
/// cache file that cannot be opened is a [`EngineError::ConfigError`].
pub fn create_file_engine(config: EngineConfig) -> EngineResult<SpreadEngine> {
    let portfolio_dir = config
        .portfolio_dir
        .as_deref()
        .ok_or_else(|| EngineError::ConfigError("portfolio_dir not configured".into()))?;
    let whitelist_file = config
        .whitelist_file
        .as_deref()
        .ok_or_else(|| EngineError::ConfigError("whitelist_file not configured".into()))?;

    let cache: Arc<dyn CacheStore> = match config.cache_path.as_deref() {
        Some(path) => Arc::new(
            treasury_ext_redb::create_redb_cache(path)
                .map_err(|e| EngineError::ConfigError(format!("cannot open cache_path {path}: {e}")))?,
        ),
        None => Arc::new(MemoryCacheStore::new(config.cache_ttl())),
    };
    info!(backend = cache.backend_name(), "portfolio cache ready");

    let mut builder = SpreadEngineBuilder::new()
        .with_portfolio_source(Arc::new(JsonPortfolioSource::new(portfolio_dir)))
        .with_whitelist_source(Arc::new(JsonWhitelistSource::new(whitelist_file)))
        .with_cache(cache);

    if let Some(prices_file) = config.prices_file.as_deref() {
        builder = builder.with_price_source(Arc::new(CsvPriceSource::new(prices_file)?));
    }

    builder.with_config(config).build()
}
