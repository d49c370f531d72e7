//! Key-value cache capability used by the fetch layer.
//!
//! Keys carry the day they were written for, so a new day naturally misses
//! and stale entries are never read back. Stores drop earlier buckets on
//! [`CacheStore::purge_before`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use treasury_core::types::Date;

use crate::error::TraitError;
use crate::ids::ChainId;

/// Cache key: `(address, chain, day)`.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct CacheKey {
    /// Treasury address.
    pub address: String,
    /// Chain the portfolio lives on.
    pub chain_id: ChainId,
    /// Day bucket.
    pub date: Date,
}

impl CacheKey {
    /// Create a new cache key.
    pub fn new(address: impl Into<String>, chain_id: ChainId, date: Date) -> Self {
        Self {
            address: address.into(),
            chain_id,
            date,
        }
    }

    /// Key bucketed on today's UTC date.
    pub fn today(address: impl Into<String>, chain_id: ChainId) -> Self {
        Self::new(address, chain_id, Date::today())
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.address, self.chain_id, self.date)
    }
}

/// Byte-valued store shared across requests.
///
/// Implementations must be safe for concurrent reads.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Backend name, for logging.
    fn backend_name(&self) -> &'static str;

    /// Read an entry.
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>, TraitError>;

    /// Write an entry, replacing any previous value.
    async fn put(&self, key: &CacheKey, value: &[u8]) -> Result<(), TraitError>;

    /// Remove every entry bucketed on a day before `date`, returning how many were removed.
    async fn purge_before(&self, date: Date) -> Result<usize, TraitError>;

    /// Check for an entry.
    async fn contains(&self, key: &CacheKey) -> Result<bool, TraitError> {
        Ok(self.get(key).await?.is_some())
    }
}
