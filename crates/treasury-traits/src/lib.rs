//! # Treasury Traits
//!
//! Trait definitions for the collaborators of the treasury engine.
//!
//! This crate contains ONLY trait definitions and the upstream payload types
//! they exchange. All implementations are in separate extension crates.
//!
//! ## Module Structure
//!
//! - [`portfolio`]: Raw portfolio payloads and the [`PortfolioSource`] trait
//! - [`prices`]: The [`PriceSource`] trait
//! - [`whitelist`]: The token [`Whitelist`] and [`WhitelistSource`] trait
//! - [`cache`]: Key-value [`CacheStore`] keyed by address, chain and day
//!
//! ## Dependency Injection
//!
//! ```ignore
//! SpreadEngineBuilder::new()
//!     .with_portfolio_source(impl PortfolioSource)
//!     .with_price_source(impl PriceSource)
//!     .with_whitelist_source(impl WhitelistSource)
//!     .build()
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cache;
pub mod error;
pub mod ids;
pub mod portfolio;
pub mod prices;
pub mod whitelist;

// Re-export commonly used types
pub use cache::{CacheKey, CacheStore};
pub use error::TraitError;
pub use ids::ChainId;
pub use portfolio::{PortfolioSource, RawBalancePoint, RawHolding, RawPortfolio, RawPortfolioItem};
pub use prices::{PriceSource, SourceType};
pub use whitelist::{Whitelist, WhitelistSource};
