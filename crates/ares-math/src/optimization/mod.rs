//! Optimization algorithms.
//!
//! - [`solve_qp`]: primal active-set method for bounded convex QPs
//! - [`ReturnRange`] / [`greedy_fill`]: exact linear extremes over the
//!   box-constrained simplex, used to build feasible starting points
//! - [`golden_section_max`]: scalar search for quasi-concave objectives

mod active_set;
mod golden;
mod simplex;

pub use active_set::{solve_qp, QpConfig, QpProblem, QpSolution};
pub use golden::{golden_section_max, ScalarOptimum};
pub use simplex::{greedy_fill, ReturnRange};
