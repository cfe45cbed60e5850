//! CLI error types.

use ares_engine::EngineError;
use ares_traits::SourceError;
use thiserror::Error;

/// CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid date format.
    #[error("Invalid date format: {0}. Use YYYY-MM-DD.")]
    InvalidDate(String),

    /// The price directory could not be opened.
    #[error("Price data unavailable: {0}")]
    Source(#[from] SourceError),

    /// The engine rejected or failed the request.
    #[error("{}: {}", .0.kind(), .0)]
    Engine(#[from] EngineError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// CLI result type.
pub type CliResult<T> = Result<T, CliError>;
