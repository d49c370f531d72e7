//! Raw portfolio payloads and the portfolio source trait.
//!
//! The payload types mirror the provider's `portfolio_v2` shape: one item
//! per token contract, each carrying a daily holding history with the
//! token's quote rate and closing balance.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use treasury_core::types::{Date, Quote};

use crate::ids::ChainId;

/// Closing balance of one day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawBalancePoint {
    /// Raw on-chain balance, an integer string in the token's smallest unit.
    #[serde(default)]
    pub balance: Option<String>,
    /// Value of the balance in quote currency.
    #[serde(default)]
    pub quote: Option<f64>,
}

/// One day of a token's holding history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawHolding {
    /// RFC 3339 timestamp of the observation.
    pub timestamp: String,
    /// Token price in quote currency, absent for unpriced tokens.
    #[serde(default)]
    pub quote_rate: Option<f64>,
    /// Closing balance of the day.
    #[serde(default)]
    pub close: Option<RawBalancePoint>,
}

impl RawHolding {
    /// Observation day, if the timestamp parses.
    pub fn date(&self) -> Option<Date> {
        Date::parse_timestamp(&self.timestamp).ok()
    }

    /// Closing value in quote currency.
    pub fn close_quote(&self) -> Option<f64> {
        self.close.as_ref().and_then(|c| c.quote)
    }

    /// Raw closing balance string.
    pub fn close_balance(&self) -> Option<&str> {
        self.close.as_ref().and_then(|c| c.balance.as_deref())
    }
}

/// One token contract held by the portfolio.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPortfolioItem {
    /// Token contract address.
    pub contract_address: String,
    /// Token name.
    #[serde(default)]
    pub contract_name: Option<String>,
    /// Ticker symbol.
    #[serde(default)]
    pub contract_ticker_symbol: Option<String>,
    /// Decimal places of the raw balance.
    #[serde(default)]
    pub contract_decimals: Option<u32>,
    /// Daily holding history.
    #[serde(default)]
    pub holdings: Vec<RawHolding>,
}

impl RawPortfolioItem {
    /// The most recent holding, i.e. the close of the window.
    ///
    /// Holdings with unparseable timestamps lose to dated ones; with no dated
    /// holding the first entry is used, matching the provider's newest-first order.
    pub fn close_holding(&self) -> Option<&RawHolding> {
        self.holdings
            .iter()
            .filter_map(|h| h.date().map(|d| (d, h)))
            .max_by_key(|(d, _)| *d)
            .map(|(_, h)| h)
            .or_else(|| self.holdings.first())
    }

    /// Closing value of the window in quote currency.
    pub fn close_quote(&self) -> Option<f64> {
        self.close_holding().and_then(RawHolding::close_quote)
    }

    /// Daily price observations with a dated timestamp and a quote rate.
    pub fn quotes(&self) -> Vec<Quote> {
        self.holdings
            .iter()
            .filter_map(|h| Some(Quote::new(h.date()?, h.quote_rate?)))
            .collect()
    }

    /// Name, falling back to the symbol.
    pub fn name(&self) -> String {
        self.contract_name
            .clone()
            .or_else(|| self.contract_ticker_symbol.clone())
            .unwrap_or_default()
    }

    /// Symbol, falling back to the address.
    pub fn symbol(&self) -> String {
        self.contract_ticker_symbol
            .clone()
            .unwrap_or_else(|| self.contract_address.clone())
    }
}

/// Portfolio of one treasury address.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPortfolio {
    /// Treasury address.
    #[serde(default)]
    pub address: String,
    /// Held token contracts.
    #[serde(default)]
    pub items: Vec<RawPortfolioItem>,
}

impl RawPortfolio {
    /// Portfolio with no items, the result of any upstream failure.
    pub fn empty(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            items: Vec::new(),
        }
    }

    /// True when there is nothing to analyse.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Trait for portfolio providers.
///
/// Implementations never fail: transport errors and malformed payloads are
/// logged and surface as [`RawPortfolio::empty`].
#[async_trait]
pub trait PortfolioSource: Send + Sync {
    /// Fetch the portfolio of `address` on `chain_id`.
    async fn fetch_portfolio(&self, address: &str, chain_id: ChainId) -> RawPortfolio;
}
