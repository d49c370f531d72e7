//! Token identities, holdings and price windows.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::date::Date;
use super::series::TimeSeries;

/// Token contract address.
///
/// Stored lowercase so that checksummed and plain hex forms compare equal.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct TokenAddress(String);

impl TokenAddress {
    /// Create a new address, normalising case.
    pub fn new(address: impl AsRef<str>) -> Self {
        Self(address.as_ref().trim().to_ascii_lowercase())
    }

    /// Get the address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TokenAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TokenAddress {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for TokenAddress {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<TokenAddress> for String {
    fn from(address: TokenAddress) -> Self {
        address.0
    }
}

/// `(symbol, address)` pair identifying a priced token.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct TokenKey {
    /// Ticker symbol, the balance-table key.
    pub symbol: String,
    /// Contract address, the identity key.
    pub address: TokenAddress,
}

impl TokenKey {
    /// Create a new token key.
    pub fn new(symbol: impl Into<String>, address: impl Into<TokenAddress>) -> Self {
        Self {
            symbol: symbol.into(),
            address: address.into(),
        }
    }
}

impl fmt::Display for TokenKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.symbol, self.address)
    }
}

/// A fungible token held by a treasury.
///
/// `balance` is a token quantity when the holding is built from upstream data.
/// Reconciliation replaces it with the end-of-window value in quote currency,
/// which is what risk weights are derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Erc20 {
    /// Token name.
    pub name: String,
    /// Ticker symbol.
    pub symbol: String,
    /// Contract address.
    pub address: TokenAddress,
    /// Quantity, or end-of-window value once reconciled.
    pub balance: f64,
    /// Additive share of portfolio volatility, once attributed.
    pub risk_contribution: Option<f64>,
}

impl Erc20 {
    /// Create a new holding with no risk contribution yet.
    pub fn new(
        name: impl Into<String>,
        symbol: impl Into<String>,
        address: impl Into<TokenAddress>,
        balance: f64,
    ) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            address: address.into(),
            balance,
            risk_contribution: None,
        }
    }

    /// The `(symbol, address)` key of this holding.
    #[must_use]
    pub fn key(&self) -> TokenKey {
        TokenKey::new(self.symbol.clone(), self.address.clone())
    }
}

/// One observed daily price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Observation day.
    pub date: Date,
    /// Price in quote currency.
    pub price: f64,
}

impl Quote {
    /// Create a new quote.
    #[must_use]
    pub fn new(date: Date, price: f64) -> Self {
        Self { date, price }
    }
}

/// Historical price window of one token.
///
/// Quotes are kept ascending with at most one quote per day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPrice {
    /// Contract address.
    pub token_address: TokenAddress,
    /// Token name.
    pub token_name: String,
    /// Ticker symbol.
    pub token_symbol: String,
    quotes: Vec<Quote>,
}

impl HistoricalPrice {
    /// Create a window; quotes are sorted and de-duplicated by day (last wins).
    pub fn new(
        token_address: impl Into<TokenAddress>,
        token_name: impl Into<String>,
        token_symbol: impl Into<String>,
        quotes: impl IntoIterator<Item = Quote>,
    ) -> Self {
        let series: TimeSeries = quotes.into_iter().map(|q| (q.date, q.price)).collect();
        Self {
            token_address: token_address.into(),
            token_name: token_name.into(),
            token_symbol: token_symbol.into(),
            quotes: series.iter().map(|(d, p)| Quote::new(d, p)).collect(),
        }
    }

    /// Quotes in ascending date order.
    #[must_use]
    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }

    /// The window as a price series.
    #[must_use]
    pub fn to_series(&self) -> TimeSeries {
        self.quotes.iter().map(|q| (q.date, q.price)).collect()
    }

    /// The `(symbol, address)` key of this window.
    #[must_use]
    pub fn key(&self) -> TokenKey {
        TokenKey::new(self.token_symbol.clone(), self.token_address.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_case_insensitive() {
        let checksummed = TokenAddress::new("0x6B175474E89094C44Da98b954EedeAC495271d0F");
        let lower = TokenAddress::from("0x6b175474e89094c44da98b954eedeac495271d0f");
        assert_eq!(checksummed, lower);
    }

    #[test]
    fn test_address_serde_normalises() {
        let addr: TokenAddress = serde_json::from_str("\"0xABC\"").unwrap();
        assert_eq!(addr.as_str(), "0xabc");
        assert_eq!(serde_json::to_string(&addr).unwrap(), "\"0xabc\"");
    }

    #[test]
    fn test_window_sorted_and_deduplicated() {
        let d1 = Date::parse("2024-01-01").unwrap();
        let d2 = Date::parse("2024-01-02").unwrap();
        let window = HistoricalPrice::new(
            "0xa",
            "Token A",
            "TKA",
            vec![Quote::new(d2, 2.0), Quote::new(d1, 1.0), Quote::new(d2, 2.5)],
        );

        let quotes = window.quotes();
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].date, d1);
        assert_eq!(quotes[1].price, 2.5);
    }
}
