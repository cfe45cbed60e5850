//! Error types for the Ares core types.
//!
//! Errors raised while constructing domain values: dates, tickers,
//! price series and aligned price matrices.

use thiserror::Error;

/// A specialized Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// The error type for core type construction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Error in date parsing or arithmetic.
    #[error("Invalid date: {message}")]
    InvalidDate {
        /// Description of the date error.
        message: String,
    },

    /// Ticker symbol is empty or malformed.
    #[error("Invalid ticker symbol '{symbol}': {reason}")]
    InvalidTicker {
        /// The rejected symbol.
        symbol: String,
        /// Reason for rejection.
        reason: String,
    },

    /// The same ticker appears twice where uniqueness is required.
    #[error("Duplicate ticker: {ticker}")]
    DuplicateTicker {
        /// The repeated ticker.
        ticker: String,
    },

    /// Price is non-positive or not finite.
    #[error("Invalid price for {ticker} on {date}: {value}")]
    InvalidPrice {
        /// Ticker of the series.
        ticker: String,
        /// Observation date.
        date: String,
        /// The rejected value.
        value: f64,
    },

    /// Series dates are not strictly increasing.
    #[error("Series for {ticker} is not strictly increasing at {date}")]
    UnorderedSeries {
        /// Ticker of the series.
        ticker: String,
        /// First offending date.
        date: String,
    },

    /// Matrix and axis dimensions disagree.
    #[error("Dimension mismatch: {reason}")]
    DimensionMismatch {
        /// Description of the mismatch.
        reason: String,
    },

    /// Ticker is not part of the index.
    #[error("Unknown ticker: {ticker}")]
    UnknownTicker {
        /// The missing ticker.
        ticker: String,
    },

    /// Invalid configuration value.
    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the problem.
        reason: String,
    },
}

impl CoreError {
    /// Creates an invalid date error.
    #[must_use]
    pub fn invalid_date(message: impl Into<String>) -> Self {
        Self::InvalidDate {
            message: message.into(),
        }
    }

    /// Creates an invalid ticker error.
    #[must_use]
    pub fn invalid_ticker(symbol: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTicker {
            symbol: symbol.into(),
            reason: reason.into(),
        }
    }

    /// Creates a dimension mismatch error.
    #[must_use]
    pub fn dimension_mismatch(reason: impl Into<String>) -> Self {
        Self::DimensionMismatch {
            reason: reason.into(),
        }
    }

    /// Creates an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}
