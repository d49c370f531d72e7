//! Price and balance tables.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::date::Date;
use super::series::TimeSeries;
use super::token::{HistoricalPrice, TokenKey};

/// Price series per `(symbol, address)`.
///
/// Series may have gaps; consumers reindex them onto their axis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceTable {
    prices: BTreeMap<TokenKey, TimeSeries>,
}

impl PriceTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from historical price windows.
    ///
    /// Windows without quotes are skipped.
    pub fn from_windows<'a>(windows: impl IntoIterator<Item = &'a HistoricalPrice>) -> Self {
        let prices = windows
            .into_iter()
            .filter(|w| !w.quotes().is_empty())
            .map(|w| (w.key(), w.to_series()))
            .collect();
        Self { prices }
    }

    /// Sets the series for a token.
    pub fn insert(&mut self, key: TokenKey, series: TimeSeries) {
        self.prices.insert(key, series);
    }

    /// Series of a token.
    #[must_use]
    pub fn get(&self, key: &TokenKey) -> Option<&TimeSeries> {
        self.prices.get(key)
    }

    /// Symbols with a price series.
    #[must_use]
    pub fn existing_token_symbols(&self) -> BTreeSet<String> {
        self.prices.keys().map(|k| k.symbol.clone()).collect()
    }

    /// Keeps only the given tokens.
    #[must_use]
    pub fn restricted_to(&self, keys: &BTreeSet<TokenKey>) -> Self {
        let prices = self
            .prices
            .iter()
            .filter(|(k, _)| keys.contains(*k))
            .map(|(k, s)| (k.clone(), s.clone()))
            .collect();
        Self { prices }
    }

    /// Number of priced tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    /// True when no token is priced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Iterates priced tokens in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&TokenKey, &TimeSeries)> {
        self.prices.iter()
    }
}

impl FromIterator<(TokenKey, TimeSeries)> for PriceTable {
    fn from_iter<I: IntoIterator<Item = (TokenKey, TimeSeries)>>(iter: I) -> Self {
        Self {
            prices: iter.into_iter().collect(),
        }
    }
}

/// Value series (quantity × price) per token symbol.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BalanceTable {
    balances: BTreeMap<String, TimeSeries>,
}

impl BalanceTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the series for a symbol, returning the previous one.
    pub fn insert(&mut self, symbol: impl Into<String>, series: TimeSeries) -> Option<TimeSeries> {
        self.balances.insert(symbol.into(), series)
    }

    /// Series of a symbol.
    #[must_use]
    pub fn get(&self, symbol: &str) -> Option<&TimeSeries> {
        self.balances.get(symbol)
    }

    /// True when the symbol has a series.
    #[must_use]
    pub fn contains(&self, symbol: &str) -> bool {
        self.balances.contains_key(symbol)
    }

    /// Symbols with a balance series.
    #[must_use]
    pub fn existing_token_symbols(&self) -> BTreeSet<String> {
        self.balances.keys().cloned().collect()
    }

    /// Sum of exact values at `date`; symbols without a value there count as zero.
    #[must_use]
    pub fn total_at(&self, date: Date) -> f64 {
        self.balances
            .values()
            .map(|s| s.value_at(date).unwrap_or(0.0))
            .sum()
    }

    /// Number of series.
    #[must_use]
    pub fn len(&self) -> usize {
        self.balances.len()
    }

    /// True when the table holds no series.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    /// Iterates series in symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &TimeSeries)> {
        self.balances.iter()
    }
}

impl FromIterator<(String, TimeSeries)> for BalanceTable {
    fn from_iter<I: IntoIterator<Item = (String, TimeSeries)>>(iter: I) -> Self {
        Self {
            balances: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for BalanceTable {
    type Item = (String, TimeSeries);
    type IntoIter = std::collections::btree_map::IntoIter<String, TimeSeries>;

    fn into_iter(self) -> Self::IntoIter {
        self.balances.into_iter()
    }
}

/// Aggregate value of a balance table over time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TotalBalance(TimeSeries);

impl TotalBalance {
    /// Wraps an aggregated series.
    #[must_use]
    pub fn new(series: TimeSeries) -> Self {
        Self(series)
    }

    /// The aggregated series.
    #[must_use]
    pub fn series(&self) -> &TimeSeries {
        &self.0
    }

    /// Exact value at `date`.
    #[must_use]
    pub fn value_at(&self, date: Date) -> Option<f64> {
        self.0.value_at(date)
    }
}
