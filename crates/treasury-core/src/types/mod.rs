//! Domain types for treasury analytics.
//!
//! - [`Date`], [`DateRange`]: the daily axis
//! - [`TimeSeries`]: date-indexed values
//! - [`Erc20`], [`TokenAddress`], [`TokenKey`]: token holdings and identities
//! - [`Quote`], [`HistoricalPrice`]: observed price windows
//! - [`Treasury`], [`AssetLookup`]: a wallet's holdings
//! - [`PriceTable`], [`BalanceTable`], [`TotalBalance`]: aligned tables

mod date;
mod series;
mod tables;
mod token;
mod treasury;

pub use date::{Date, DateRange};
pub use series::TimeSeries;
pub use tables::{BalanceTable, PriceTable, TotalBalance};
pub use token::{Erc20, HistoricalPrice, Quote, TokenAddress, TokenKey};
pub use treasury::{AssetLookup, Treasury};
