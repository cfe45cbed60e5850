//! # Ares Math
//!
//! Numerical building blocks for the Ares portfolio allocation engine.
//!
//! This crate provides:
//!
//! - **Linear Algebra**: Quadratic forms, symmetric eigenvalues, PSD checks,
//!   LU and SVD least-squares solves
//! - **Optimization**: A bounded active-set QP solver, linear extremes over
//!   the capped simplex, golden-section search
//!
//! ## Design Philosophy
//!
//! - **Numerical Stability**: SVD-based KKT solves tolerate semi-definite
//!   covariance matrices
//! - **Bounded Work**: Every iterative routine takes an iteration budget and
//!   an optional deadline
//!
//! ## Example
//!
//! ```rust
//! use ares_math::prelude::*;
//! use nalgebra::{DMatrix, DVector};
//!
//! // Minimum-variance weights of two uncorrelated assets.
//! let problem = QpProblem {
//!     quadratic: DMatrix::from_diagonal(&DVector::from_vec(vec![0.04, 0.01])),
//!     linear: DVector::zeros(2),
//!     equality_matrix: DMatrix::from_element(1, 2, 1.0),
//!     equality_rhs: DVector::from_element(1, 1.0),
//!     lower: DVector::zeros(2),
//!     upper: DVector::from_element(2, 1.0),
//! };
//! let start = DVector::from_element(2, 0.5);
//! let solution = solve_qp(&problem, &start, &QpConfig::default())?;
//! assert!((solution.x[1] - 0.8).abs() < 1e-9);
//! # Ok::<(), ares_math::MathError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::similar_names)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::needless_range_loop)]
#![allow(clippy::unreadable_literal)]
#![allow(clippy::uninlined_format_args)]

pub mod error;
pub mod linear_algebra;
pub mod optimization;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{MathError, MathResult};
    pub use crate::linear_algebra::{
        covariance_to_correlation, is_positive_semidefinite, is_symmetric, quadratic_form,
        solve_least_squares, solve_linear_system, symmetric_eigenvalues,
    };
    pub use crate::optimization::{
        golden_section_max, greedy_fill, solve_qp, QpConfig, QpProblem, QpSolution, ReturnRange,
        ScalarOptimum,
    };
}

pub use error::{MathError, MathResult};
