//! # Treasury Ext Redb
//!
//! Embedded cache store using redb for the treasury spread engine.
//!
//! Entries are keyed by the rendered [`CacheKey`], `{address}_{chain_id}_{date}`,
//! so each day starts with an empty bucket. `purge_before` removes the
//! buckets of earlier days.

#![warn(missing_docs)]
#![warn(clippy::all)]

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use redb::{Database, ReadableTable, ReadableTableMetadata, TableDefinition};
use tracing::debug;

use treasury_core::types::Date;
use treasury_traits::cache::{CacheKey, CacheStore};
use treasury_traits::error::TraitError;

// Table definitions
const PORTFOLIO_CACHE: TableDefinition<&str, &[u8]> = TableDefinition::new("portfolio_cache");

/// Redb-based cache store.
pub struct RedbCacheStore {
    db: Arc<Database>,
}

impl RedbCacheStore {
    /// Create a new redb cache store.
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Number of cached entries.
    pub fn len(&self) -> Result<u64, TraitError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| TraitError::DatabaseError(e.to_string()))?;

        let table = match read_txn.open_table(PORTFOLIO_CACHE) {
            Ok(t) => t,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(0),
            Err(e) => return Err(TraitError::DatabaseError(e.to_string())),
        };

        table.len().map_err(|e| TraitError::DatabaseError(e.to_string()))
    }

    /// True when nothing is cached.
    pub fn is_empty(&self) -> Result<bool, TraitError> {
        Ok(self.len()? == 0)
    }
}

#[async_trait]
impl CacheStore for RedbCacheStore {
    fn backend_name(&self) -> &'static str {
        "redb"
    }

    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>, TraitError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| TraitError::DatabaseError(e.to_string()))?;

        let table = match read_txn.open_table(PORTFOLIO_CACHE) {
            Ok(t) => t,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => return Err(TraitError::DatabaseError(e.to_string())),
        };

        match table.get(key.to_string().as_str()) {
            Ok(Some(data)) => Ok(Some(data.value().to_vec())),
            Ok(None) => Ok(None),
            Err(e) => Err(TraitError::DatabaseError(e.to_string())),
        }
    }

    async fn put(&self, key: &CacheKey, value: &[u8]) -> Result<(), TraitError> {
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| TraitError::DatabaseError(e.to_string()))?;
        {
            let mut table = write_txn
                .open_table(PORTFOLIO_CACHE)
                .map_err(|e| TraitError::DatabaseError(e.to_string()))?;

            table
                .insert(key.to_string().as_str(), value)
                .map_err(|e| TraitError::DatabaseError(e.to_string()))?;
        }
        write_txn
            .commit()
            .map_err(|e| TraitError::DatabaseError(e.to_string()))?;
        Ok(())
    }

    /// Keys whose date suffix does not parse are left alone.
    async fn purge_before(&self, date: Date) -> Result<usize, TraitError> {
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| TraitError::DatabaseError(e.to_string()))?;
        let purged = {
            let mut table = write_txn
                .open_table(PORTFOLIO_CACHE)
                .map_err(|e| TraitError::DatabaseError(e.to_string()))?;

            let mut stale = Vec::new();
            for entry in table
                .iter()
                .map_err(|e| TraitError::DatabaseError(e.to_string()))?
            {
                let (key, _) = entry.map_err(|e| TraitError::DatabaseError(e.to_string()))?;
                let key = key.value();
                let bucket = key
                    .rsplit_once('_')
                    .and_then(|(_, day)| Date::parse(day).ok());
                if bucket.is_some_and(|day| day < date) {
                    stale.push(key.to_string());
                }
            }

            for key in &stale {
                table
                    .remove(key.as_str())
                    .map_err(|e| TraitError::DatabaseError(e.to_string()))?;
            }
            stale.len()
        };
        write_txn
            .commit()
            .map_err(|e| TraitError::DatabaseError(e.to_string()))?;

        debug!(before = %date, purged, "purged cache buckets");
        Ok(purged)
    }
}

/// Create a cache store backed by the redb file at `path`.
pub fn create_redb_cache(path: impl AsRef<Path>) -> Result<RedbCacheStore, TraitError> {
    let db = Database::create(path).map_err(|e| TraitError::DatabaseError(e.to_string()))?;
    Ok(RedbCacheStore::new(Arc::new(db)))
}
