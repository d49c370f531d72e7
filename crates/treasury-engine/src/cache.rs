//! Portfolio caching.
//!
//! [`CachedPortfolioSource`] puts any [`CacheStore`] in front of any
//! [`PortfolioSource`]. Keys are bucketed on the UTC day of the request, so a
//! cached portfolio is served for the rest of that day only. Every write purges
//! the buckets of earlier days.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::{debug, warn};

use treasury_core::types::Date;
use treasury_traits::cache::{CacheKey, CacheStore};
use treasury_traits::error::TraitError;
use treasury_traits::ids::ChainId;
use treasury_traits::portfolio::{PortfolioSource, RawPortfolio};

/// In-memory cache store with optional TTL.
pub struct MemoryCacheStore {
    entries: DashMap<CacheKey, CachedEntry>,
    ttl: Option<Duration>,
}

struct CachedEntry {
    bytes: Vec<u8>,
    stored_at: Instant,
}

impl MemoryCacheStore {
    /// Create a new store; entries older than `ttl` are evicted on read.
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    fn is_expired(&self, entry: &CachedEntry) -> bool {
        self.ttl
            .is_some_and(|ttl| entry.stored_at.elapsed() > ttl)
    }

    /// Remove expired entries.
    pub fn cleanup_expired(&self) {
        if let Some(ttl) = self.ttl {
            self.entries.retain(|_, e| e.stored_at.elapsed() <= ttl);
        }
    }

    /// Number of stored entries, expired or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Clear all entries.
    pub fn clear(&self) {
        self.entries.clear();
    }
}

impl Default for MemoryCacheStore {
    fn default() -> Self {
        Self::new(Some(Duration::from_secs(86_400))) // 1 day
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>, TraitError> {
        self.entries.remove_if(key, |_, entry| self.is_expired(entry));
        Ok(self.entries.get(key).map(|e| e.bytes.clone()))
    }

    async fn put(&self, key: &CacheKey, value: &[u8]) -> Result<(), TraitError> {
        self.entries.insert(
            key.clone(),
            CachedEntry {
                bytes: value.to_vec(),
                stored_at: Instant::now(),
            },
        );
        Ok(())
    }

    async fn purge_before(&self, date: Date) -> Result<usize, TraitError> {
        let before = self.entries.len();
        self.entries.retain(|key, _| key.date >= date);
        Ok(before.saturating_sub(self.entries.len()))
    }
}

/// Portfolio source that consults a cache before the wrapped source.
///
/// Empty portfolios are never written, so a degraded upstream is retried on
/// the next request. Cache failures are logged and bypassed.
pub struct CachedPortfolioSource {
    inner: Arc<dyn PortfolioSource>,
    cache: Arc<dyn CacheStore>,
}

impl CachedPortfolioSource {
    /// Wrap `inner` with `cache`.
    pub fn new(inner: Arc<dyn PortfolioSource>, cache: Arc<dyn CacheStore>) -> Self {
        Self { inner, cache }
    }

    async fn lookup(&self, key: &CacheKey) -> Option<RawPortfolio> {
        let bytes = match self.cache.get(key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                warn!(backend = self.cache.backend_name(), key = %key, error = %e, "cache read failed");
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(portfolio) => Some(portfolio),
            Err(e) => {
                warn!(backend = self.cache.backend_name(), key = %key, error = %e, "discarding undecodable cache entry");
                None
            }
        }
    }

    async fn store(&self, key: &CacheKey, portfolio: &RawPortfolio) {
        let result = match serde_json::to_vec(portfolio) {
            Ok(bytes) => self.cache.put(key, &bytes).await,
            Err(e) => Err(TraitError::SerializationError(e.to_string())),
        };
        if let Err(e) = result {
            warn!(backend = self.cache.backend_name(), key = %key, error = %e, "cache write failed");
            return;
        }

        match self.cache.purge_before(key.date).await {
            Ok(0) => {}
            Ok(purged) => debug!(backend = self.cache.backend_name(), before = %key.date, purged, "evicted stale cache buckets"),
            Err(e) => warn!(backend = self.cache.backend_name(), error = %e, "cache purge failed"),
        }
    }
}

#[async_trait]
impl PortfolioSource for CachedPortfolioSource {
    async fn fetch_portfolio(&self, address: &str, chain_id: ChainId) -> RawPortfolio {
        let key = CacheKey::today(address.trim().to_lowercase(), chain_id);

        if let Some(portfolio) = self.lookup(&key).await {
            debug!(key = %key, backend = self.cache.backend_name(), "portfolio cache hit");
            return portfolio;
        }
        debug!(key = %key, backend = self.cache.backend_name(), "portfolio cache miss");

        let portfolio = self.inner.fetch_portfolio(address, chain_id).await;
        if portfolio.is_empty() {
            debug!(key = %key, "not caching empty portfolio");
        } else {
            self.store(&key, &portfolio).await;
        }
        portfolio
    }
}
