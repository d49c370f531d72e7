//! Engine error types.

use thiserror::Error;

use treasury_core::TreasuryError;
use treasury_traits::TraitError;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Engine error type.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration error
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// Malformed request
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A collaborator failed with a typed error
    #[error("upstream error: {0}")]
    UpstreamError(#[from] TraitError),

    /// Analytics contract violation
    #[error("analytics error: {0}")]
    AnalyticsError(#[from] TreasuryError),
}
