//! File-based price sources.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use dashmap::DashMap;
use serde::Deserialize;
use tracing::debug;

use treasury_core::types::{Date, DateRange, PriceTable, TimeSeries, TokenKey};
use treasury_traits::error::TraitError;
use treasury_traits::prices::{PriceSource, SourceType};

// =============================================================================
// CSV PRICE SOURCE
// =============================================================================

/// CSV record for daily prices.
#[derive(Debug, Deserialize)]
struct PriceRecord {
    symbol: String,
    address: String,
    date: String,
    price: f64,
}

/// CSV-based daily price source for backtests.
///
/// Columns: `symbol,address,date,price` with `YYYY-MM-DD` dates. A later row
/// for the same token and day overwrites an earlier one.
pub struct CsvPriceSource {
    file_path: PathBuf,
    prices: DashMap<TokenKey, TimeSeries>,
}

impl CsvPriceSource {
    /// Create a new CSV price source.
    pub fn new(file_path: impl AsRef<Path>) -> Result<Self, TraitError> {
        let source = Self {
            file_path: file_path.as_ref().to_path_buf(),
            prices: DashMap::new(),
        };
        source.reload()?;
        Ok(source)
    }

    /// Reload prices from file.
    pub fn reload(&self) -> Result<(), TraitError> {
        if !self.file_path.exists() {
            return Ok(()); // Empty source
        }

        let mut reader =
            csv::Reader::from_path(&self.file_path).map_err(|e| TraitError::IoError(e.to_string()))?;

        self.prices.clear();
        for result in reader.deserialize() {
            let record: PriceRecord = result.map_err(|e| TraitError::ParseError(e.to_string()))?;
            let date = Date::parse(&record.date)?;
            self.prices
                .entry(TokenKey::new(record.symbol, record.address))
                .or_default()
                .insert(date, record.price);
        }

        debug!(path = %self.file_path.display(), tokens = self.prices.len(), "loaded price file");
        Ok(())
    }

    /// Number of tokens with a price series.
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    /// True when no token is priced.
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

#[async_trait]
impl PriceSource for CsvPriceSource {
    fn source_type(&self) -> SourceType {
        SourceType::File
    }

    async fn fetch_prices(
        &self,
        tokens: &BTreeSet<TokenKey>,
        _range: &DateRange,
    ) -> Result<PriceTable, TraitError> {
        Ok(tokens
            .iter()
            .filter_map(|key| self.prices.get(key).map(|s| (key.clone(), s.clone())))
            .collect())
    }
}

// =============================================================================
// EMPTY SOURCE
// =============================================================================

/// Price source that prices nothing.
pub struct EmptyPriceSource;

#[async_trait]
impl PriceSource for EmptyPriceSource {
    fn source_type(&self) -> SourceType {
        SourceType::File
    }

    async fn fetch_prices(
        &self,
        _tokens: &BTreeSet<TokenKey>,
        _range: &DateRange,
    ) -> Result<PriceTable, TraitError> {
        Ok(PriceTable::new())
    }
}
