//! # Ares Analytics
//!
//! The quantitative core of the Ares portfolio allocation engine.
//!
//! Everything here is a pure function of its inputs: aligned prices go in,
//! an allocation and the analytics that justify it come out.
//!
//! - **Returns**: simple daily returns from a [`PriceMatrix`](ares_core::PriceMatrix)
//! - **Estimation**: Ledoit-Wolf shrinkage covariance, annualized expected returns
//! - **Optimization**: minimum-variance, target-return and maximum-Sharpe
//!   portfolios under budget and weight bounds, plus the efficient frontier
//! - **Risk**: parametric and historical VaR, correlation, variance
//!   contributions, crash stress tests
//! - **Backtest**: buy-and-hold with monthly contributions against a benchmark
//! - **Strategy**: Conservative / Balanced / Aggressive labels
//!
//! ## Example
//!
//! ```rust
//! use ares_analytics::prelude::*;
//! use ares_core::EngineConfig;
//! use nalgebra::{DMatrix, DVector};
//!
//! let cov = DMatrix::from_row_slice(2, 2, &[0.01, 0.006, 0.006, 0.04]);
//! let mu = DVector::from_vec(vec![0.08, 0.12]);
//! let config = EngineConfig::default().with_risk_free_rate(0.02);
//!
//! let optimizer = PortfolioOptimizer::new(cov, mu, &config)?;
//! let tangency = optimizer.max_sharpe()?;
//! assert!((tangency.weights.iter().sum::<f64>() - 1.0).abs() < 1e-9);
//! # Ok::<(), ares_analytics::AnalyticsError>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `parallel` (default): solve frontier targets on the rayon pool

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::similar_names)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::needless_range_loop)]
#![allow(clippy::neg_cmp_op_on_partial_ord)]
#![allow(clippy::uninlined_format_args)]

pub mod backtest;
pub mod error;
pub mod estimation;
pub mod optimization;
pub mod parallel;
pub mod pipeline;
pub mod returns;
pub mod risk;
pub mod strategy;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::backtest::{align_benchmark, run_backtest, BacktestParams, BacktestResult};
    pub use crate::error::{AnalyticsError, AnalyticsResult};
    pub use crate::estimation::{estimate_covariance, expected_returns, CovarianceEstimate};
    pub use crate::optimization::{
        efficient_frontier, efficient_frontier_with_points, FrontierPoint, OptimizationMethod,
        OptimizedPortfolio, PortfolioOptimizer, PortfolioPerformance, MIN_ASSETS,
    };
    pub use crate::pipeline::{
        analyze_portfolio, estimate_market, frontier_only, horizon_backtest, AllocationParams,
        MarketEstimates, PortfolioAnalysis,
    };
    pub use crate::returns::{compute_returns, ReturnMatrix};
    pub use crate::risk::{
        historical_var, labeled_contributions, labeled_correlation, parametric_var,
        standard_stress_tests, stress_test, CorrelationTable, HistoricalVar, RiskContribution,
        StressScenario, VarResult,
    };
    pub use crate::strategy::Strategy;
}

pub use error::{AnalyticsError, AnalyticsResult};
pub use pipeline::{analyze_portfolio, AllocationParams, PortfolioAnalysis};
