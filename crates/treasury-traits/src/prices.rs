//! Historical price source trait.

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use treasury_core::types::{DateRange, PriceTable, TokenKey};

use crate::error::TraitError;

/// Source type for price data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceType {
    /// Snapshot/request-response (REST APIs)
    Snapshot,
    /// File-based (CSV, JSON)
    File,
    /// Database (for historical/EOD)
    Database,
    /// Derived from the portfolio's own holding history
    Portfolio,
}

/// Trait for historical price providers.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Source type.
    fn source_type(&self) -> SourceType;

    /// Fetch daily prices for `tokens` covering `range`.
    ///
    /// Tokens the source cannot price are simply absent from the table.
    /// Series may extend past the range or contain gaps.
    async fn fetch_prices(
        &self,
        tokens: &BTreeSet<TokenKey>,
        range: &DateRange,
    ) -> Result<PriceTable, TraitError>;
}
