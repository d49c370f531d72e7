//! # Treasury Ext File
//!
//! File-based collaborators for the treasury spread engine.
//!
//! This crate provides default implementations for backtests and offline runs:
//! - JSON portfolio source reading saved provider responses
//! - CSV daily price source
//! - JSON token-list whitelist source
//! - Empty and static sources for tests
//!
//! For live holdings, implement [`PortfolioSource`] against the data provider.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod portfolio;
mod prices;
mod whitelist;

pub use portfolio::*;
pub use prices::*;
pub use whitelist::*;

use std::path::Path;
use std::sync::Arc;

use treasury_traits::error::TraitError;
use treasury_traits::{PortfolioSource, PriceSource, WhitelistSource};

/// File-backed collaborator set.
pub struct FileSources {
    /// Portfolio source.
    pub portfolio: Arc<dyn PortfolioSource>,
    /// Price source.
    pub prices: Arc<dyn PriceSource>,
    /// Whitelist source.
    pub whitelist: Arc<dyn WhitelistSource>,
}

/// Create file-based sources from a portfolio directory, price CSV and whitelist JSON.
pub fn create_file_sources(
    portfolio_dir: impl AsRef<Path>,
    prices_csv: impl AsRef<Path>,
    whitelist_json: impl AsRef<Path>,
) -> Result<FileSources, TraitError> {
    Ok(FileSources {
        portfolio: Arc::new(JsonPortfolioSource::new(portfolio_dir)),
        prices: Arc::new(CsvPriceSource::new(prices_csv)?),
        whitelist: Arc::new(JsonWhitelistSource::new(whitelist_json)),
    })
}
