//! # Treasury Analytics
//!
//! Pure analytics for the treasury spread backtest.
//!
//! This crate turns raw portfolio holdings and historical prices into
//! balance series and risk contributions, and simulates the spread strategy:
//!
//! - **Whitelist filter**: [`filter_holdings`], [`treasury_from_portfolio`],
//!   [`retain_priced_assets`]
//! - **Balances**: [`build_balances`], [`total_balance`]
//! - **Spread**: [`apply_spread`], [`resize_balances`], [`reconcile`]
//! - **Risk**: [`risk_attribution`], [`attribute_risk`]
//!
//! ## Pipeline
//!
//! ```text
//! raw portfolio ──► filter ──► balances ──► spread ──► reconcile ──► risk
//!                                 ▲
//!                            price table
//! ```
//!
//! Every function takes its inputs explicitly and performs no I/O. Missing
//! prices are forward-filled (zero before the first observation) and a
//! zero-variance window attributes zero risk; neither is an error.
//!
//! ## Example
//!
//! ```rust
//! use treasury_analytics::prelude::*;
//! use treasury_core::prelude::*;
//!
//! let range = DateRange::parse("2022-01-01", "2022-01-03").unwrap();
//! let treasury = Treasury::new("0xtreasury", vec![Erc20::new("Token A", "A", "0xa", 10.0)], vec![]);
//!
//! let mut prices = PriceTable::new();
//! prices.insert(TokenKey::new("A", "0xa"), TimeSeries::constant(&range, 1.0));
//!
//! let balances = build_balances(&treasury, &prices, &range);
//! let balances = apply_spread(balances, "USDR", 20.0, &range).unwrap();
//! assert_eq!(balances.total_at(range.start()), 10.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::float_cmp)]

pub mod balances;
pub mod risk;
pub mod spread;
pub mod whitelist;

pub use balances::{build_balances, total_balance};
pub use risk::{attribute_risk, risk_attribution, RiskAttribution, TokenContribution};
pub use spread::{apply_spread, reconcile, resize_balances, validate_spread_percentage, SpreadToken};
pub use whitelist::{close_quantity, filter_holdings, retain_priced_assets, scale_raw_balance, treasury_from_portfolio};

// Re-export the error type shared with the core crate
pub use treasury_core::error::{TreasuryError, TreasuryResult};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::balances::{build_balances, total_balance};
    pub use crate::risk::{attribute_risk, risk_attribution, RiskAttribution, TokenContribution};
    pub use crate::spread::{apply_spread, reconcile, resize_balances, SpreadToken};
    pub use crate::whitelist::{filter_holdings, retain_priced_assets, treasury_from_portfolio};
}
