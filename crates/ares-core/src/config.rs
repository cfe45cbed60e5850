//! Engine configuration.
//!
//! One immutable [`EngineConfig`] is built per process (or per request) and
//! threaded through every pipeline stage. Nothing in the engine reads ambient
//! or global parameters.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{CoreError, CoreResult};

/// Structured target the sample covariance is shrunk toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShrinkageTarget {
    /// Average pairwise correlation times the product of volatilities.
    #[default]
    ConstantCorrelation,
    /// Scaled identity with the average sample variance.
    ConstantVariance,
    /// No shrinkage; plain sample covariance.
    None,
}

/// Estimator for annualized expected returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnEstimator {
    /// Mean daily return times trading days per year.
    #[default]
    ArithmeticMean,
    /// Geometric growth rate annualized from the whole window.
    Compounded,
}

/// Which input drives the strategy label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyBasis {
    /// The requested risk tolerance.
    #[default]
    RiskTolerance,
    /// Realized annual volatility of the optimized portfolio.
    Volatility,
}

/// Iteration and tolerance limits for each QP solve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverBudget {
    /// Maximum active-set iterations per solve.
    pub max_iterations: usize,
    /// Feasibility and optimality tolerance.
    pub tolerance: f64,
    /// Tolerance used when a solve is retried after a convergence failure.
    pub relaxed_tolerance: f64,
}

impl Default for SolverBudget {
    fn default() -> Self {
        Self {
            max_iterations: 500,
            tolerance: 1e-10,
            relaxed_tolerance: 1e-7,
        }
    }
}

impl SolverBudget {
    /// Returns the same budget with the relaxed tolerance and twice the
    /// iterations.
    #[must_use]
    pub fn relaxed(&self) -> Self {
        Self {
            max_iterations: self.max_iterations.saturating_mul(2),
            tolerance: self.relaxed_tolerance,
            relaxed_tolerance: self.relaxed_tolerance,
        }
    }
}

/// How series with different calendars are aligned.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentPolicy {
    /// Minimum fraction of the union date axis a series must cover to be
    /// kept.
    pub min_coverage: f64,
}

impl Default for AlignmentPolicy {
    fn default() -> Self {
        Self { min_coverage: 0.8 }
    }
}

impl AlignmentPolicy {
    /// Sets the minimum coverage.
    #[must_use]
    pub fn with_min_coverage(mut self, min_coverage: f64) -> Self {
        self.min_coverage = min_coverage;
        self
    }

    /// Checks that the coverage threshold is a fraction.
    pub fn validate(&self) -> CoreResult<()> {
        if !(0.0..=1.0).contains(&self.min_coverage) {
            return Err(CoreError::invalid_config(format!(
                "min_coverage must be in [0, 1], got {}",
                self.min_coverage
            )));
        }
        Ok(())
    }
}

/// Configuration threaded through every stage of the allocation pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Annual risk-free rate used in Sharpe ratios.
    pub risk_free_rate: f64,

    /// Trading days used to annualize daily statistics.
    pub trading_days_per_year: usize,

    /// Restrict weights to be non-negative.
    pub long_only: bool,

    /// Upper bound on any single weight.
    pub max_weight: f64,

    /// Minimum aligned trading days required per ticker.
    pub min_trading_days: usize,

    /// Number of target returns swept by the frontier.
    pub frontier_points: usize,

    /// One-tailed VaR confidence level.
    pub var_confidence: f64,

    /// Uniform crash applied by the stress test (negative fraction).
    pub stress_crash_pct: f64,

    /// Covariance shrinkage target.
    pub shrinkage: ShrinkageTarget,

    /// Expected return estimator.
    pub return_estimator: ReturnEstimator,

    /// Strategy label basis.
    pub strategy_basis: StrategyBasis,

    /// QP solver limits.
    pub solver: SolverBudget,

    /// Series alignment policy.
    pub alignment: AlignmentPolicy,

    /// Enable parallel frontier sweeps (requires the `parallel` feature).
    pub parallel: bool,

    /// Minimum frontier point count to trigger parallel processing.
    pub parallel_threshold: usize,

    /// Wall-clock limit for one optimization request, in milliseconds.
    pub request_timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.05,
            trading_days_per_year: 252,
            long_only: true,
            max_weight: 1.0,
            min_trading_days: 30,
            frontier_points: 30,
            var_confidence: 0.95,
            stress_crash_pct: -0.20,
            shrinkage: ShrinkageTarget::default(),
            return_estimator: ReturnEstimator::default(),
            strategy_basis: StrategyBasis::default(),
            solver: SolverBudget::default(),
            alignment: AlignmentPolicy::default(),
            parallel: true,
            parallel_threshold: 16,
            request_timeout_ms: 30_000,
        }
    }
}

impl EngineConfig {
    /// Creates a config with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the risk-free rate.
    #[must_use]
    pub fn with_risk_free_rate(mut self, rate: f64) -> Self {
        self.risk_free_rate = rate;
        self
    }

    /// Sets the per-asset weight cap.
    #[must_use]
    pub fn with_max_weight(mut self, cap: f64) -> Self {
        self.max_weight = cap;
        self
    }

    /// Sets the minimum trading days.
    #[must_use]
    pub fn with_min_trading_days(mut self, days: usize) -> Self {
        self.min_trading_days = days;
        self
    }

    /// Sets the frontier point count.
    #[must_use]
    pub fn with_frontier_points(mut self, points: usize) -> Self {
        self.frontier_points = points;
        self
    }

    /// Sets the VaR confidence level.
    #[must_use]
    pub fn with_var_confidence(mut self, confidence: f64) -> Self {
        self.var_confidence = confidence;
        self
    }

    /// Sets the stress crash percentage.
    #[must_use]
    pub fn with_stress_crash(mut self, crash_pct: f64) -> Self {
        self.stress_crash_pct = crash_pct;
        self
    }

    /// Sets the shrinkage target.
    #[must_use]
    pub fn with_shrinkage(mut self, target: ShrinkageTarget) -> Self {
        self.shrinkage = target;
        self
    }

    /// Sets the expected return estimator.
    #[must_use]
    pub fn with_return_estimator(mut self, estimator: ReturnEstimator) -> Self {
        self.return_estimator = estimator;
        self
    }

    /// Sets the strategy basis.
    #[must_use]
    pub fn with_strategy_basis(mut self, basis: StrategyBasis) -> Self {
        self.strategy_basis = basis;
        self
    }

    /// Sets the solver budget.
    #[must_use]
    pub fn with_solver(mut self, solver: SolverBudget) -> Self {
        self.solver = solver;
        self
    }

    /// Sets the alignment policy.
    #[must_use]
    pub fn with_alignment(mut self, alignment: AlignmentPolicy) -> Self {
        self.alignment = alignment;
        self
    }

    /// Sets whether to use parallel processing.
    #[must_use]
    pub fn with_parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// The request timeout as a `Duration`.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Returns true if the configuration asks for parallel work at this
    /// count. Callers still gate on their own `parallel` feature.
    #[must_use]
    pub fn wants_parallel(&self, count: usize) -> bool {
        self.parallel && count >= self.parallel_threshold
    }

    /// Checks every field for a usable value.
    pub fn validate(&self) -> CoreResult<()> {
        if !self.risk_free_rate.is_finite() {
            return Err(CoreError::invalid_config("risk_free_rate must be finite"));
        }
        if self.trading_days_per_year == 0 {
            return Err(CoreError::invalid_config(
                "trading_days_per_year must be positive",
            ));
        }
        if !(self.max_weight > 0.0 && self.max_weight <= 1.0) {
            return Err(CoreError::invalid_config(format!(
                "max_weight must be in (0, 1], got {}",
                self.max_weight
            )));
        }
        if self.min_trading_days < 2 {
            return Err(CoreError::invalid_config("min_trading_days must be at least 2"));
        }
        if self.frontier_points < 2 {
            return Err(CoreError::invalid_config("frontier_points must be at least 2"));
        }
        if !(self.var_confidence > 0.5 && self.var_confidence < 1.0) {
            return Err(CoreError::invalid_config(format!(
                "var_confidence must be in (0.5, 1), got {}",
                self.var_confidence
            )));
        }
        if !(self.stress_crash_pct > -1.0 && self.stress_crash_pct <= 0.0) {
            return Err(CoreError::invalid_config(format!(
                "stress_crash_pct must be in (-1, 0], got {}",
                self.stress_crash_pct
            )));
        }
        if self.solver.max_iterations == 0 || !(self.solver.tolerance > 0.0) {
            return Err(CoreError::invalid_config(
                "solver needs positive iterations and tolerance",
            ));
        }
        self.alignment.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let config = EngineConfig::default();
        assert_eq!(config.risk_free_rate, 0.05);
        assert_eq!(config.trading_days_per_year, 252);
        assert!(config.long_only);
        assert_eq!(config.max_weight, 1.0);
        assert_eq!(config.min_trading_days, 30);
        assert_eq!(config.frontier_points, 30);
        assert_eq!(config.var_confidence, 0.95);
        assert_eq!(config.stress_crash_pct, -0.20);
        assert_eq!(config.shrinkage, ShrinkageTarget::ConstantCorrelation);
        assert_eq!(config.strategy_basis, StrategyBasis::RiskTolerance);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = EngineConfig::new()
            .with_risk_free_rate(0.02)
            .with_max_weight(0.4)
            .with_shrinkage(ShrinkageTarget::None)
            .with_request_timeout(Duration::from_secs(5));
        assert_eq!(config.risk_free_rate, 0.02);
        assert_eq!(config.max_weight, 0.4);
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_validate_rejects() {
        assert!(EngineConfig::new().with_max_weight(0.0).validate().is_err());
        assert!(EngineConfig::new().with_var_confidence(0.4).validate().is_err());
        assert!(EngineConfig::new().with_stress_crash(0.1).validate().is_err());
        let bad_alignment = AlignmentPolicy::default().with_min_coverage(1.5);
        assert!(EngineConfig::new()
            .with_alignment(bad_alignment)
            .validate()
            .is_err());
    }

    #[test]
    fn test_relaxed_budget() {
        let budget = SolverBudget::default().relaxed();
        assert_eq!(budget.tolerance, 1e-7);
        assert_eq!(budget.max_iterations, 1000);
    }

    #[test]
    fn test_serde_partial() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"risk_free_rate": 0.03, "shrinkage": "constant_variance"}"#)
                .unwrap();
        assert_eq!(config.risk_free_rate, 0.03);
        assert_eq!(config.shrinkage, ShrinkageTarget::ConstantVariance);
        assert_eq!(config.frontier_points, 30);
    }
}
