//! Engine configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use treasury_traits::ChainId;

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Chain used when a request does not name one
    #[serde(default = "default_chain_id")]
    pub default_chain_id: u64,

    /// Spread percentage used when a request does not name one
    #[serde(default = "default_spread_percentage")]
    pub default_spread_percentage: f64,

    /// In-memory cache TTL in seconds (0 = entries live until a later day's write purges them)
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Redb cache file; the in-memory cache is used when absent
    pub cache_path: Option<String>,

    /// Directory of saved portfolio responses
    pub portfolio_dir: Option<String>,

    /// Daily price CSV
    pub prices_file: Option<String>,

    /// Token whitelist JSON
    pub whitelist_file: Option<String>,
}

fn default_chain_id() -> u64 {
    ChainId::ETHEREUM.value()
}

fn default_spread_percentage() -> f64 {
    20.0
}

fn default_cache_ttl_secs() -> u64 {
    86_400 // 1 day
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_chain_id: default_chain_id(),
            default_spread_percentage: default_spread_percentage(),
            cache_ttl_secs: default_cache_ttl_secs(),
            cache_path: None,
            portfolio_dir: None,
            prices_file: None,
            whitelist_file: None,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    /// Default chain.
    pub fn chain_id(&self) -> ChainId {
        ChainId::new(self.default_chain_id)
    }

    /// In-memory cache TTL, `None` when disabled.
    pub fn cache_ttl(&self) -> Option<Duration> {
        (self.cache_ttl_secs > 0).then(|| Duration::from_secs(self.cache_ttl_secs))
    }
}
