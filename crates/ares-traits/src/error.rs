//! Error types for price sources.

use thiserror::Error;

/// Result type for source operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Common error type for price sources.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Source not available
    #[error("source not available: {0}")]
    SourceNotAvailable(String),

    /// Operation timed out
    #[error("timeout")]
    Timeout,

    /// Parse/deserialization error
    #[error("parse error: {0}")]
    ParseError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(String),

    /// Invalid input
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for SourceError {
    fn from(e: std::io::Error) -> Self {
        SourceError::IoError(e.to_string())
    }
}

impl From<ares_core::CoreError> for SourceError {
    fn from(e: ares_core::CoreError) -> Self {
        SourceError::ParseError(e.to_string())
    }
}
