//! Mean-variance portfolio optimizer.
//!
//! All problems share the feasible set `{ Σw = 1, l ≤ w ≤ u }` with
//! `l = 0` for long-only configurations and `u = max_weight`. Weights that
//! violate a bound are never clipped and renormalized; the bounds are
//! constraints of the QP.

use std::time::Instant;

use ares_core::config::{EngineConfig, SolverBudget};
use ares_math::linear_algebra::solve_linear_system;
use ares_math::optimization::{
    golden_section_max, solve_qp, QpConfig, QpProblem, ReturnRange,
};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::error::{AnalyticsError, AnalyticsResult};

/// Minimum number of assets for a meaningful allocation.
pub const MIN_ASSETS: usize = 2;

/// Relative bracket width at which the tangency search stops.
const SHARPE_SEARCH_TOLERANCE: f64 = 1e-7;

/// Maximum golden-section reductions in the tangency search.
const SHARPE_SEARCH_ITERATIONS: u32 = 80;

/// Expected return, volatility and Sharpe ratio of a weight vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortfolioPerformance {
    /// Annualized expected return.
    pub expected_return: f64,
    /// Annualized volatility.
    pub volatility: f64,
    /// `(expected_return − rf) / volatility`.
    pub sharpe_ratio: f64,
}

/// How a weight vector was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationMethod {
    /// Global minimum variance.
    MinVariance,
    /// Minimum variance at a target return.
    TargetReturn,
    /// Maximum Sharpe ratio.
    MaxSharpe,
    /// Minimum variance returned because no asset beats the risk-free rate.
    MinVarianceFallback,
}

/// Weights with their performance.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizedPortfolio {
    /// Weights by ticker position.
    pub weights: Vec<f64>,
    /// Performance of `weights`.
    pub performance: PortfolioPerformance,
    /// How the weights were obtained.
    pub method: OptimizationMethod,
}

/// Optimizer over an annualized covariance matrix and expected returns.
#[derive(Debug, Clone)]
pub struct PortfolioOptimizer {
    covariance: DMatrix<f64>,
    expected_returns: DVector<f64>,
    risk_free_rate: f64,
    lower: DVector<f64>,
    upper: DVector<f64>,
    range: ReturnRange,
    qp: QpConfig,
}

impl PortfolioOptimizer {
    /// Creates an optimizer with bounds and solver budget from `config`.
    ///
    /// # Errors
    ///
    /// - `AnalyticsError::BelowMinimumAssets` with fewer than two assets
    /// - `AnalyticsError::DimensionMismatch` if shapes disagree
    /// - `AnalyticsError::InfeasibleOptimization` if the weight cap cannot
    ///   reach a fully invested portfolio
    pub fn new(
        covariance: DMatrix<f64>,
        expected_returns: DVector<f64>,
        config: &EngineConfig,
    ) -> AnalyticsResult<Self> {
        let n = expected_returns.len();
        if n < MIN_ASSETS {
            return Err(AnalyticsError::BelowMinimumAssets {
                available: n,
                required: MIN_ASSETS,
            });
        }
        if covariance.shape() != (n, n) {
            return Err(AnalyticsError::dimension_mismatch(format!(
                "covariance is {}x{}, expected {n}x{n}",
                covariance.nrows(),
                covariance.ncols()
            )));
        }
        if covariance.iter().chain(expected_returns.iter()).any(|v| !v.is_finite()) {
            return Err(AnalyticsError::invalid_input(
                "covariance and expected returns must be finite",
            ));
        }

        let floor = if config.long_only { 0.0 } else { -config.max_weight };
        let lower = DVector::from_element(n, floor);
        let upper = DVector::from_element(n, config.max_weight);
        let range = ReturnRange::new(&expected_returns, &lower, &upper)
            .map_err(|e| AnalyticsError::from_math("bounds", e))?;

        Ok(Self {
            covariance,
            expected_returns,
            risk_free_rate: config.risk_free_rate,
            lower,
            upper,
            range,
            qp: qp_config(&config.solver, None),
        })
    }

    /// Replaces the solver budget.
    #[must_use]
    pub fn with_solver(mut self, budget: &SolverBudget) -> Self {
        self.qp = qp_config(budget, self.qp.deadline);
        self
    }

    /// Sets a wall-clock deadline for every solve.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Option<Instant>) -> Self {
        self.qp.deadline = deadline;
        self
    }

    /// Number of assets.
    #[must_use]
    pub fn n_assets(&self) -> usize {
        self.expected_returns.len()
    }

    /// Annualized expected returns.
    #[must_use]
    pub fn expected_returns(&self) -> &DVector<f64> {
        &self.expected_returns
    }

    /// Annualized covariance.
    #[must_use]
    pub fn covariance(&self) -> &DMatrix<f64> {
        &self.covariance
    }

    /// Smallest and largest achievable portfolio return.
    #[must_use]
    pub fn return_range(&self) -> &ReturnRange {
        &self.range
    }

    /// Performance of an arbitrary weight vector.
    #[must_use]
    pub fn performance(&self, weights: &DVector<f64>) -> PortfolioPerformance {
        let expected_return = self.expected_returns.dot(weights);
        let variance = weights.dot(&(&self.covariance * weights)).max(0.0);
        let volatility = variance.sqrt();
        let sharpe_ratio = if volatility > 0.0 {
            (expected_return - self.risk_free_rate) / volatility
        } else {
            0.0
        };
        PortfolioPerformance {
            expected_return,
            volatility,
            sharpe_ratio,
        }
    }

    /// Global minimum-variance portfolio (budget and bounds only).
    pub fn min_variance(&self) -> AnalyticsResult<OptimizedPortfolio> {
        let n = self.n_assets();
        let equal = DVector::from_element(n, 1.0 / n as f64);
        let start = if self.within_bounds(&equal) {
            equal
        } else {
            self.range.argmin.clone()
        };
        let problem = self.problem(None);
        let solution = solve_qp(&problem, &start, &self.qp)
            .map_err(|e| AnalyticsError::from_math("min_variance", e))?;
        Ok(self.finish(solution.x, OptimizationMethod::MinVariance))
    }

    /// Minimum-variance portfolio with `μᵀw = target_return`.
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::InfeasibleOptimization` when the target lies
    /// outside the achievable return range.
    pub fn min_variance_for_target(&self, target_return: f64) -> AnalyticsResult<OptimizedPortfolio> {
        let tolerance = 1e-9 * (1.0 + target_return.abs());
        if !target_return.is_finite() || !self.range.contains(target_return, tolerance) {
            return Err(AnalyticsError::infeasible(
                "target_return",
                format!(
                    "target {target_return:.6} outside achievable range [{:.6}, {:.6}]",
                    self.range.min, self.range.max
                ),
            ));
        }

        // Every feasible portfolio has the same return; the target row would
        // duplicate the budget row.
        if self.range.max - self.range.min <= tolerance {
            let mut portfolio = self.min_variance()?;
            portfolio.method = OptimizationMethod::TargetReturn;
            return Ok(portfolio);
        }

        let target = target_return.clamp(self.range.min, self.range.max);
        let start = self
            .range
            .point_at(target, tolerance)
            .map_err(|e| AnalyticsError::from_math("target_return", e))?;
        let problem = self.problem(Some(target));
        let solution = solve_qp(&problem, &start, &self.qp)
            .map_err(|e| AnalyticsError::from_math("target_return", e))?;
        Ok(self.finish(solution.x, OptimizationMethod::TargetReturn))
    }

    /// Maximum-Sharpe (tangency) portfolio.
    ///
    /// Along the efficient frontier the Sharpe ratio is quasi-concave in the
    /// target return wherever it is positive, so a golden-section search over
    /// `[max(r_mv, rf), r_max]` with a min-variance solve at each probe finds
    /// the global optimum. The unconstrained tangency `Σ⁻¹(μ − rf)` seeds an
    /// extra candidate; the best feasible candidate wins.
    ///
    /// When no portfolio can beat the risk-free rate the minimum-variance
    /// portfolio is returned instead.
    pub fn max_sharpe(&self) -> AnalyticsResult<OptimizedPortfolio> {
        let min_var = self.min_variance()?;
        if self.range.max <= self.risk_free_rate {
            tracing::warn!(
                risk_free_rate = self.risk_free_rate,
                best_return = self.range.max,
                "no asset beats the risk-free rate, falling back to minimum variance"
            );
            let mut fallback = min_var;
            fallback.method = OptimizationMethod::MinVarianceFallback;
            return Ok(fallback);
        }

        let lo = min_var.performance.expected_return.max(self.risk_free_rate);
        let hi = self.range.max;
        let mut candidates = vec![min_var];

        if hi > lo {
            let search = golden_section_max(
                |target| self.min_variance_for_target(target).map(|p| p.performance.sharpe_ratio),
                lo,
                hi,
                SHARPE_SEARCH_TOLERANCE,
                SHARPE_SEARCH_ITERATIONS,
            )?;
            tracing::debug!(
                target_return = search.x,
                sharpe = search.value,
                iterations = search.iterations,
                "tangency search converged"
            );
            candidates.push(self.min_variance_for_target(search.x)?);
        }

        if let Some(analytic) = self.analytic_tangency() {
            let target = self.expected_returns.dot(&analytic);
            if self.within_bounds(&analytic) {
                candidates.push(self.finish(analytic, OptimizationMethod::MaxSharpe));
            } else if (lo..=hi).contains(&target) {
                match self.min_variance_for_target(target) {
                    Ok(portfolio) => candidates.push(portfolio),
                    Err(e) if e.is_skippable() => {
                        tracing::debug!(error = %e, "analytic candidate skipped");
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        let mut best = candidates
            .into_iter()
            .max_by(|a, b| {
                a.performance
                    .sharpe_ratio
                    .total_cmp(&b.performance.sharpe_ratio)
            })
            .ok_or_else(|| AnalyticsError::infeasible("max_sharpe", "no candidate portfolio"))?;
        best.method = OptimizationMethod::MaxSharpe;
        Ok(best)
    }

    /// Unconstrained tangency `Σ⁻¹(μ − rf·1)`, normalized to sum to one.
    fn analytic_tangency(&self) -> Option<DVector<f64>> {
        let excess = self.expected_returns.add_scalar(-self.risk_free_rate);
        let raw = solve_linear_system(&self.covariance, &excess).ok()?;
        let total = raw.sum();
        if total.abs() < 1e-12 {
            return None;
        }
        let weights = raw / total;
        weights.iter().all(|w| w.is_finite()).then_some(weights)
    }

    fn within_bounds(&self, weights: &DVector<f64>) -> bool {
        weights
            .iter()
            .zip(self.lower.iter().zip(self.upper.iter()))
            .all(|(&w, (&lo, &hi))| w >= lo && w <= hi)
    }

    fn problem(&self, target: Option<f64>) -> QpProblem {
        let n = self.n_assets();
        let (equality_matrix, equality_rhs) = match target {
            Some(t) => (
                DMatrix::from_fn(2, n, |r, c| if r == 0 { 1.0 } else { self.expected_returns[c] }),
                DVector::from_vec(vec![1.0, t]),
            ),
            None => (DMatrix::from_element(1, n, 1.0), DVector::from_element(1, 1.0)),
        };
        QpProblem {
            quadratic: &self.covariance * 2.0,
            linear: DVector::zeros(n),
            equality_matrix,
            equality_rhs,
            lower: self.lower.clone(),
            upper: self.upper.clone(),
        }
    }

    fn finish(&self, weights: DVector<f64>, method: OptimizationMethod) -> OptimizedPortfolio {
        OptimizedPortfolio {
            performance: self.performance(&weights),
            weights: weights.iter().copied().collect(),
            method,
        }
    }
}

fn qp_config(budget: &SolverBudget, deadline: Option<Instant>) -> QpConfig {
    QpConfig::default()
        .with_tolerance(budget.tolerance)
        .with_max_iterations(u32::try_from(budget.max_iterations).unwrap_or(u32::MAX))
        .with_deadline(deadline)
}
