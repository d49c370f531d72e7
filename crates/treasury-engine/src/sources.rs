//! Price source backed by a treasury's own quote windows.

use std::collections::BTreeSet;

use async_trait::async_trait;

use treasury_core::types::{DateRange, HistoricalPrice, PriceTable, TokenKey};
use treasury_traits::error::TraitError;
use treasury_traits::prices::{PriceSource, SourceType};

/// Prices taken from the quote history that came with the portfolio.
///
/// Used when the engine has no dedicated price source. Tokens whose window
/// holds no quotes are unpriced.
pub struct WindowPriceSource {
    table: PriceTable,
}

impl WindowPriceSource {
    /// Create a source over `windows`.
    pub fn new<'a>(windows: impl IntoIterator<Item = &'a HistoricalPrice>) -> Self {
        Self {
            table: PriceTable::from_windows(windows),
        }
    }
}

#[async_trait]
impl PriceSource for WindowPriceSource {
    fn source_type(&self) -> SourceType {
        SourceType::Portfolio
    }

    async fn fetch_prices(
        &self,
        tokens: &BTreeSet<TokenKey>,
        _range: &DateRange,
    ) -> Result<PriceTable, TraitError> {
        Ok(self.table.restricted_to(tokens))
    }
}
