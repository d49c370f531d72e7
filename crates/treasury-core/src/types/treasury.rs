//! Treasury record.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::token::{Erc20, HistoricalPrice, TokenKey};

/// Result of looking an asset up by symbol.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AssetLookup<'a> {
    /// The asset is held.
    Found(&'a Erc20),
    /// No asset carries this symbol.
    NotFound,
}

impl AssetLookup<'_> {
    /// True when the asset was found.
    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, AssetLookup::Found(_))
    }
}

/// An address's token holdings plus their price history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Treasury {
    /// Treasury wallet address.
    pub address: String,
    /// Retained holdings.
    pub assets: Vec<Erc20>,
    /// Price windows for every upstream item, retained or not.
    pub windows: Vec<HistoricalPrice>,
}

impl Treasury {
    /// Create a new treasury.
    pub fn new(address: impl Into<String>, assets: Vec<Erc20>, windows: Vec<HistoricalPrice>) -> Self {
        Self {
            address: address.into(),
            assets,
            windows,
        }
    }

    /// Treasury with no holdings, the degraded-upstream result.
    pub fn empty(address: impl Into<String>) -> Self {
        Self::new(address, Vec::new(), Vec::new())
    }

    /// Looks an asset up by symbol.
    #[must_use]
    pub fn find_asset(&self, symbol: &str) -> AssetLookup<'_> {
        self.assets
            .iter()
            .find(|a| a.symbol == symbol)
            .map_or(AssetLookup::NotFound, AssetLookup::Found)
    }

    /// `(symbol, address)` pairs of every asset.
    #[must_use]
    pub fn token_keys(&self) -> BTreeSet<TokenKey> {
        self.assets.iter().map(Erc20::key).collect()
    }

    /// Number of retained assets.
    #[must_use]
    pub fn num_assets(&self) -> usize {
        self.assets.len()
    }
}
