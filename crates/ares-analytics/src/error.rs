//! Error types for the analytics pipeline.
//!
//! Every error carries the ticker or the pipeline stage it came from.

use ares_core::CoreError;
use ares_math::MathError;
use thiserror::Error;

/// Result type for analytics operations.
pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

/// Errors that can occur while computing an allocation or its analytics.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    /// Too few aligned trading days for a ticker.
    #[error("Insufficient data for {ticker}: {available} trading days, need {required}")]
    InsufficientData {
        /// Ticker that bounds the aligned window.
        ticker: String,
        /// Trading days available.
        available: usize,
        /// Trading days required.
        required: usize,
    },

    /// Fewer assets than the optimization needs.
    #[error("At least {required} assets are required, got {available}")]
    BelowMinimumAssets {
        /// Assets available.
        available: usize,
        /// Assets required.
        required: usize,
    },

    /// An asset has zero sample variance.
    #[error("Degenerate covariance: {ticker} has zero variance")]
    DegenerateCovariance {
        /// Ticker with flat prices.
        ticker: String,
    },

    /// The constraint set has no solution.
    #[error("Infeasible optimization in {stage}: {reason}")]
    InfeasibleOptimization {
        /// Pipeline stage.
        stage: String,
        /// Which constraint cannot be met.
        reason: String,
    },

    /// The solver exhausted its iteration budget.
    #[error("Numerical convergence failure in {stage} after {iterations} iterations")]
    NumericalConvergence {
        /// Pipeline stage.
        stage: String,
        /// Iterations attempted.
        iterations: u32,
    },

    /// The solver ran past the request deadline.
    #[error("Deadline exceeded in {stage}")]
    DeadlineExceeded {
        /// Pipeline stage.
        stage: String,
    },

    /// Invalid input parameter.
    #[error("Invalid input: {reason}")]
    InvalidInput {
        /// Description of the invalid input.
        reason: String,
    },

    /// Vector and matrix dimensions disagree.
    #[error("Dimension mismatch: {reason}")]
    DimensionMismatch {
        /// Description of the mismatch.
        reason: String,
    },

    /// Error from core type construction.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Uncategorized numerical error.
    #[error(transparent)]
    Math(#[from] MathError),
}

impl AnalyticsError {
    /// Creates an invalid input error.
    #[must_use]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
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

    /// Creates an infeasible optimization error.
    #[must_use]
    pub fn infeasible(stage: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InfeasibleOptimization {
            stage: stage.into(),
            reason: reason.into(),
        }
    }

    /// Attaches a stage to a solver error.
    #[must_use]
    pub fn from_math(stage: &str, error: MathError) -> Self {
        match error {
            MathError::Infeasible { reason } => Self::infeasible(stage, reason),
            MathError::ConvergenceFailed { iterations, .. } => Self::NumericalConvergence {
                stage: stage.to_string(),
                iterations,
            },
            MathError::DeadlineExceeded { .. } => Self::DeadlineExceeded {
                stage: stage.to_string(),
            },
            other => Self::Math(other),
        }
    }

    /// Returns true for errors the frontier sweep skips instead of failing.
    #[must_use]
    pub fn is_skippable(&self) -> bool {
        matches!(
            self,
            Self::InfeasibleOptimization { .. } | Self::NumericalConvergence { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_math_maps_stage() {
        let err = AnalyticsError::from_math("max_sharpe", MathError::convergence_failed(500, 1e-3));
        assert_eq!(
            err,
            AnalyticsError::NumericalConvergence {
                stage: "max_sharpe".into(),
                iterations: 500
            }
        );
        assert!(err.is_skippable());

        let err = AnalyticsError::from_math("frontier", MathError::DeadlineExceeded { iterations: 3 });
        assert!(matches!(err, AnalyticsError::DeadlineExceeded { .. }));
        assert!(!err.is_skippable());

        let err = AnalyticsError::from_math("frontier", MathError::SingularMatrix);
        assert!(matches!(err, AnalyticsError::Math(_)));
    }

    #[test]
    fn test_error_display() {
        let err = AnalyticsError::InsufficientData {
            ticker: "ABNB".into(),
            available: 12,
            required: 30,
        };
        let msg = err.to_string();
        assert!(msg.contains("ABNB"));
        assert!(msg.contains("12"));
    }
}
