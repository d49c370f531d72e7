//! Error types for treasury analytics.
//!
//! Only genuine contract violations surface here. Missing prices and
//! zero-variance windows are resolved numerically and never become errors.

use thiserror::Error;

/// A specialized Result type for treasury operations.
pub type TreasuryResult<T> = Result<T, TreasuryError>;

/// The main error type for treasury operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreasuryError {
    /// Error in date parsing or an invalid calendar date.
    #[error("Invalid date: {message}")]
    InvalidDate {
        /// Description of the date error.
        message: String,
    },

    /// Window whose start lies after its end.
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Requested start date.
        start: String,
        /// Requested end date.
        end: String,
    },

    /// Spread percentage outside `[0, 100]`.
    #[error("Invalid spread percentage: {value} (must be within 0..=100)")]
    InvalidSpreadPercentage {
        /// The rejected percentage.
        value: f64,
    },

    /// The spread reserve token is neither a treasury asset nor a balance entry.
    #[error("Spread reserve token '{symbol}' has no balance series")]
    MissingReserveToken {
        /// Symbol of the reserve token.
        symbol: String,
    },

    /// A retained asset has no balance series.
    #[error("Asset '{symbol}' has no balance series")]
    MissingBalance {
        /// Symbol of the asset.
        symbol: String,
    },

    /// Two retained assets share a symbol.
    #[error("Duplicate asset symbol '{symbol}'")]
    DuplicateSymbol {
        /// The repeated symbol.
        symbol: String,
    },

    /// Numerical calculation failed.
    #[error("Calculation failed: {reason}")]
    CalculationFailed {
        /// Description of what went wrong.
        reason: String,
    },
}

impl TreasuryError {
    /// Creates an invalid date error.
    #[must_use]
    pub fn invalid_date(message: impl Into<String>) -> Self {
        Self::InvalidDate {
            message: message.into(),
        }
    }

    /// Creates a missing reserve token error.
    #[must_use]
    pub fn missing_reserve_token(symbol: impl Into<String>) -> Self {
        Self::MissingReserveToken {
            symbol: symbol.into(),
        }
    }

    /// Creates a missing balance error.
    #[must_use]
    pub fn missing_balance(symbol: impl Into<String>) -> Self {
        Self::MissingBalance {
            symbol: symbol.into(),
        }
    }

    /// Creates a calculation failure error.
    #[must_use]
    pub fn calculation_failed(reason: impl Into<String>) -> Self {
        Self::CalculationFailed {
            reason: reason.into(),
        }
    }
}
