//! Engine error types.

use ares_analytics::AnalyticsError;
use ares_core::CoreError;
use ares_traits::SourceError;
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Engine error type.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A request field failed validation
    #[error("invalid {field}: {reason}")]
    Validation {
        /// Offending field.
        field: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Analytics pipeline error
    #[error(transparent)]
    Analytics(#[from] AnalyticsError),

    /// Core type error
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Price source error
    #[error("price source error: {0}")]
    Source(#[from] SourceError),

    /// The request ran past its deadline
    #[error("deadline exceeded after {elapsed_ms} ms")]
    DeadlineExceeded {
        /// Time spent before giving up.
        elapsed_ms: u64,
    },

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl EngineError {
    /// Creates a validation error.
    #[must_use]
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Stable machine-readable error kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::Analytics(e) => match e {
                AnalyticsError::InsufficientData { .. } => "insufficient_data",
                AnalyticsError::BelowMinimumAssets { .. } => "below_minimum_assets",
                AnalyticsError::DegenerateCovariance { .. } => "degenerate_covariance",
                AnalyticsError::InfeasibleOptimization { .. } => "infeasible_optimization",
                AnalyticsError::NumericalConvergence { .. } => "numerical_convergence",
                AnalyticsError::DeadlineExceeded { .. } => "deadline_exceeded",
                AnalyticsError::InvalidInput { .. } => "validation",
                AnalyticsError::Core(core) => core_kind(core),
                AnalyticsError::DimensionMismatch { .. } | AnalyticsError::Math(_) => "internal",
            },
            Self::Core(e) => core_kind(e),
            Self::Source(_) => "source",
            Self::DeadlineExceeded { .. } => "deadline_exceeded",
            Self::Internal(_) => "internal",
        }
    }

    /// Returns true if the caller can fix the request.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        !matches!(self.kind(), "internal" | "source" | "deadline_exceeded")
    }

    /// Returns true if the request timed out.
    #[must_use]
    pub fn is_deadline(&self) -> bool {
        self.kind() == "deadline_exceeded"
    }
}

fn core_kind(error: &CoreError) -> &'static str {
    match error {
        CoreError::InvalidTicker { .. } | CoreError::UnknownTicker { .. } => "invalid_ticker",
        CoreError::DimensionMismatch { .. } => "internal",
        _ => "validation",
    }
}

impl From<tokio::task::JoinError> for EngineError {
    fn from(e: tokio::task::JoinError) -> Self {
        EngineError::Internal(format!("optimization task failed: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        let err = EngineError::from(AnalyticsError::BelowMinimumAssets {
            available: 1,
            required: 2,
        });
        assert_eq!(err.kind(), "below_minimum_assets");
        assert!(err.is_client_error());

        let err = EngineError::from(CoreError::invalid_ticker("$$", "illegal character"));
        assert_eq!(err.kind(), "invalid_ticker");

        let err = EngineError::DeadlineExceeded { elapsed_ms: 30_000 };
        assert!(err.is_deadline());
        assert!(!err.is_client_error());

        let err = EngineError::from(AnalyticsError::DeadlineExceeded {
            stage: "frontier".into(),
        });
        assert!(err.is_deadline());
    }

    #[test]
    fn test_validation_message() {
        let err = EngineError::validation("investment", "must be at least 1000");
        assert_eq!(err.to_string(), "invalid investment: must be at least 1000");
        assert_eq!(err.kind(), "validation");
    }
}
