//! # Treasury Engine
//!
//! The spread backtest engine for on-chain treasuries.
//!
//! This crate provides:
//! - [`SpreadEngine`]: Request pipeline from raw holdings to balances and risk
//! - [`SpreadEngineBuilder`]: Dependency injection of collaborators
//! - [`CachedPortfolioSource`], [`MemoryCacheStore`]: Day-bucketed portfolio caching
//! - [`WindowPriceSource`]: Prices from the portfolio's own quote history
//! - [`EngineConfig`]: TOML configuration
//!
//! ## Architecture
//!
//! ```text
//! PortfolioSource ─┐
//!                  ├─> Treasury ─> Balances ─> Spread ─> Reconcile ─> Risk
//! WhitelistSource ─┘                  ▲
//!                                PriceSource
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let engine = SpreadEngineBuilder::new()
//!     .with_config(config)
//!     .with_portfolio_source(portfolio_source)
//!     .with_whitelist_source(whitelist_source)
//!     .with_price_source(price_source)
//!     .with_cache(cache_store)
//!     .build()?;
//!
//! let backtest = engine.backtest(&request).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builder;
pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod sources;

// Re-exports
pub use builder::{create_file_engine, SpreadEngineBuilder};
pub use cache::{CachedPortfolioSource, MemoryCacheStore};
pub use config::EngineConfig;
pub use engine::{SpreadBacktest, SpreadEngine, SpreadRequest};
pub use error::{EngineError, EngineResult};
pub use sources::WindowPriceSource;
