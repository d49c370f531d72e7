//! # Treasury Core
//!
//! Core types for the treasury analytics workspace.
//!
//! This crate provides the foundational building blocks used by the analytics
//! and engine crates:
//!
//! - **Dates**: [`Date`] and the inclusive daily [`DateRange`] axis
//! - **Time series**: [`TimeSeries`], an ordered date-to-value map with explicit
//!   forward-fill reindexing and outer-join arithmetic
//! - **Tokens**: [`Erc20`] holdings, [`TokenAddress`], [`TokenKey`]
//! - **Treasury**: [`Treasury`] with its assets and historical price windows
//! - **Tables**: [`PriceTable`], [`BalanceTable`], [`TotalBalance`]
//!
//! ## Design Philosophy
//!
//! - **Explicit alignment**: no implicit index alignment; every series is
//!   reindexed onto a [`DateRange`] before it is combined
//! - **Request scoped**: nothing here is persisted or shared across requests
//!
//! ## Example
//!
//! ```rust
//! use treasury_core::prelude::*;
//!
//! let range = DateRange::new(
//!     Date::from_ymd(2024, 1, 1).unwrap(),
//!     Date::from_ymd(2024, 1, 3).unwrap(),
//! )
//! .unwrap();
//!
//! let prices = TimeSeries::from_points([(Date::from_ymd(2023, 12, 30).unwrap(), 2.0)]);
//! let aligned = prices.reindex_ffill(&range);
//! assert_eq!(aligned.len(), 3);
//! assert_eq!(aligned.value_at(range.end()), Some(2.0));
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
#![allow(clippy::return_self_not_must_use)]

pub mod error;
pub mod types;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{TreasuryError, TreasuryResult};
    pub use crate::types::{
        AssetLookup, BalanceTable, Date, DateRange, Erc20, HistoricalPrice, PriceTable, Quote,
        TimeSeries, TokenAddress, TokenKey, TotalBalance, Treasury,
    };
}

// Re-export commonly used types at crate root
pub use error::{TreasuryError, TreasuryResult};
pub use types::{Date, DateRange, TimeSeries, TokenAddress, Treasury};
