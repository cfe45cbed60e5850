//! Error types for mathematical operations.

use thiserror::Error;

/// A specialized Result type for mathematical operations.
pub type MathResult<T> = Result<T, MathError>;

/// Errors that can occur during mathematical operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    /// Iterative algorithm exhausted its iteration budget.
    #[error("Convergence failed after {iterations} iterations (residual: {residual:.2e})")]
    ConvergenceFailed {
        /// Number of iterations attempted.
        iterations: u32,
        /// Final residual value.
        residual: f64,
    },

    /// Iterative algorithm ran past its wall-clock deadline.
    #[error("Deadline exceeded after {iterations} iterations")]
    DeadlineExceeded {
        /// Number of iterations completed.
        iterations: u32,
    },

    /// The constraint set admits no solution.
    #[error("Infeasible problem: {reason}")]
    Infeasible {
        /// Which constraint cannot be met.
        reason: String,
    },

    /// The objective decreases without bound on the feasible set.
    #[error("Unbounded problem")]
    Unbounded,

    /// Matrix is singular (not invertible).
    #[error("Singular matrix: cannot invert")]
    SingularMatrix,

    /// Matrix dimensions are incompatible.
    #[error("Incompatible matrix dimensions: ({rows1}x{cols1}) and ({rows2}x{cols2})")]
    DimensionMismatch {
        /// Rows in first matrix.
        rows1: usize,
        /// Columns in first matrix.
        cols1: usize,
        /// Rows in second matrix.
        rows2: usize,
        /// Columns in second matrix.
        cols2: usize,
    },

    /// Insufficient data points for operation.
    #[error("Insufficient data: need at least {required}, got {actual}")]
    InsufficientData {
        /// Minimum required points.
        required: usize,
        /// Actual number of points.
        actual: usize,
    },

    /// Invalid input parameter.
    #[error("Invalid input: {reason}")]
    InvalidInput {
        /// Description of the invalid input.
        reason: String,
    },
}

impl MathError {
    /// Creates a convergence failed error.
    #[must_use]
    pub fn convergence_failed(iterations: u32, residual: f64) -> Self {
        Self::ConvergenceFailed {
            iterations,
            residual,
        }
    }

    /// Creates an infeasible problem error.
    #[must_use]
    pub fn infeasible(reason: impl Into<String>) -> Self {
        Self::Infeasible {
            reason: reason.into(),
        }
    }

    /// Creates an invalid input error.
    #[must_use]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Creates an insufficient data error.
    #[must_use]
    pub fn insufficient_data(required: usize, actual: usize) -> Self {
        Self::InsufficientData { required, actual }
    }

    /// Creates a dimension mismatch error from two shapes.
    #[must_use]
    pub fn dimension_mismatch(left: (usize, usize), right: (usize, usize)) -> Self {
        Self::DimensionMismatch {
            rows1: left.0,
            cols1: left.1,
            rows2: right.0,
            cols2: right.1,
        }
    }
}
