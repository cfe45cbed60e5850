//! The end-to-end analytics pass over one request.
//!
//! Stages run strictly downstream: prices → returns → (Σ, μ) → weights →
//! frontier, risk, backtest and strategy. Nothing is cached between calls.

use std::time::Instant;

use ares_core::{EngineConfig, PriceMatrix, TickerIndex};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::backtest::{run_backtest, BacktestParams, BacktestResult};
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::estimation::{estimate_covariance, expected_returns, CovarianceEstimate};
use crate::optimization::{
    efficient_frontier, efficient_frontier_with_points, FrontierPoint, OptimizedPortfolio,
    PortfolioOptimizer,
};
use crate::returns::{compute_returns, ReturnMatrix};
use crate::risk::{
    historical_var, labeled_contributions, labeled_correlation, parametric_var,
    standard_stress_tests, stress_test, CorrelationTable, HistoricalVar, RiskContribution,
    StressScenario, VarResult,
};
use crate::strategy::Strategy;

/// Caller-supplied parameters of one allocation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AllocationParams {
    /// Portfolio value in currency units.
    pub investment: f64,
    /// Risk preference in [0, 1].
    pub risk_tolerance: f64,
    /// Backtest horizon in years.
    pub time_horizon_years: u32,
    /// Monthly contribution for the backtest.
    pub monthly_contribution: f64,
}

impl AllocationParams {
    /// Creates parameters with no contributions.
    #[must_use]
    pub fn new(investment: f64, risk_tolerance: f64, time_horizon_years: u32) -> Self {
        Self {
            investment,
            risk_tolerance,
            time_horizon_years,
            monthly_contribution: 0.0,
        }
    }

    /// Sets the monthly contribution.
    #[must_use]
    pub fn with_monthly_contribution(mut self, amount: f64) -> Self {
        self.monthly_contribution = amount;
        self
    }
}

/// Returns, covariance and expected returns of an aligned universe.
#[derive(Debug, Clone)]
pub struct MarketEstimates {
    /// Daily simple returns.
    pub returns: ReturnMatrix,
    /// Shrunk covariance.
    pub covariance: CovarianceEstimate,
    /// Annualized expected returns by position.
    pub expected_returns: Vec<f64>,
}

impl MarketEstimates {
    /// Ticker table shared by every vector and matrix.
    #[must_use]
    pub fn index(&self) -> &TickerIndex {
        self.returns.index()
    }

    /// Optimizer over these estimates.
    pub fn optimizer(
        &self,
        config: &EngineConfig,
        deadline: Option<Instant>,
    ) -> AnalyticsResult<PortfolioOptimizer> {
        Ok(PortfolioOptimizer::new(
            self.covariance.annual.clone(),
            DVector::from_column_slice(&self.expected_returns),
            config,
        )?
        .with_deadline(deadline))
    }
}

/// Everything the engine reports for one allocation.
#[derive(Debug, Clone)]
pub struct PortfolioAnalysis {
    /// Tickers in weight order.
    pub index: TickerIndex,
    /// Optimal weights and performance.
    pub portfolio: OptimizedPortfolio,
    /// Strategy label.
    pub strategy: Strategy,
    /// Shrinkage intensity used for Σ.
    pub shrinkage: f64,
    /// Efficient frontier.
    pub frontier: Vec<FrontierPoint>,
    /// Parametric VaR.
    pub var: VarResult,
    /// Historical one-day VaR.
    pub historical_var: HistoricalVar,
    /// Pairwise correlations.
    pub correlation: CorrelationTable,
    /// Variance shares, largest first.
    pub contributions: Vec<RiskContribution>,
    /// Configured crash scenario.
    pub stress: StressScenario,
    /// Standard crash ladder.
    pub stress_ladder: Vec<StressScenario>,
    /// Backtest over the horizon.
    pub backtest: BacktestResult,
}

/// Estimates returns, covariance and expected returns from aligned prices.
pub fn estimate_market(prices: &PriceMatrix, config: &EngineConfig) -> AnalyticsResult<MarketEstimates> {
    let returns = compute_returns(prices, config.min_trading_days)?;
    let covariance = estimate_covariance(&returns, config.shrinkage, config.trading_days_per_year)?;
    let mu = expected_returns(&returns, config.return_estimator, config.trading_days_per_year)?;
    Ok(MarketEstimates {
        returns,
        covariance,
        expected_returns: mu.iter().copied().collect(),
    })
}

/// Frontier only, with an explicit point count.
pub fn frontier_only(
    prices: &PriceMatrix,
    points: usize,
    config: &EngineConfig,
    deadline: Option<Instant>,
) -> AnalyticsResult<Vec<FrontierPoint>> {
    let estimates = estimate_market(prices, config)?;
    let optimizer = estimates.optimizer(config, deadline)?;
    efficient_frontier_with_points(&optimizer, points, config)
}

/// Runs the complete analytics pass.
///
/// `prices` is the full aligned history used for estimation; the backtest
/// replays its last `time_horizon_years` of rows. `benchmark` holds one
/// close per date of `prices`.
///
/// # Errors
///
/// Any stage error is returned as is; no partial analysis is produced.
pub fn analyze_portfolio(
    prices: &PriceMatrix,
    benchmark: &[f64],
    params: &AllocationParams,
    config: &EngineConfig,
    deadline: Option<Instant>,
) -> AnalyticsResult<PortfolioAnalysis> {
    if benchmark.len() != prices.n_days() {
        return Err(AnalyticsError::dimension_mismatch(format!(
            "{} benchmark prices for {} days",
            benchmark.len(),
            prices.n_days()
        )));
    }

    let estimates = estimate_market(prices, config)?;
    let optimizer = estimates.optimizer(config, deadline)?;
    let portfolio = optimizer.max_sharpe()?;
    tracing::info!(
        assets = portfolio.weights.len(),
        expected_return = portfolio.performance.expected_return,
        volatility = portfolio.performance.volatility,
        sharpe = portfolio.performance.sharpe_ratio,
        method = ?portfolio.method,
        "allocation solved"
    );

    let frontier = efficient_frontier(&optimizer, config)?;
    let index = estimates.index().clone();
    let cov = &estimates.covariance;
    let weights = &portfolio.weights;

    let var = parametric_var(weights, &cov.daily, &cov.annual, params.investment, config.var_confidence)?;
    let daily_portfolio = estimates.returns.portfolio_returns(weights)?;
    let historical_var = historical_var(&daily_portfolio, params.investment, config.var_confidence)?;
    let correlation = labeled_correlation(&cov.annual, &index)?;
    let contributions = labeled_contributions(weights, &cov.annual, &index)?;
    let stress = stress_test(weights, params.investment, config.stress_crash_pct)?;
    let stress_ladder = standard_stress_tests(weights, params.investment)?;

    let backtest = horizon_backtest(prices, benchmark, weights, params, config)?;
    let strategy = Strategy::classify(
        config.strategy_basis,
        params.risk_tolerance,
        portfolio.performance.volatility,
    );

    Ok(PortfolioAnalysis {
        index,
        shrinkage: cov.shrinkage,
        portfolio,
        strategy,
        frontier,
        var,
        historical_var,
        correlation,
        contributions,
        stress,
        stress_ladder,
        backtest,
    })
}

/// Backtest over the last `time_horizon_years` of `prices`.
pub fn horizon_backtest(
    prices: &PriceMatrix,
    benchmark: &[f64],
    weights: &[f64],
    params: &AllocationParams,
    config: &EngineConfig,
) -> AnalyticsResult<BacktestResult> {
    if benchmark.len() != prices.n_days() {
        return Err(AnalyticsError::dimension_mismatch(format!(
            "{} benchmark prices for {} days",
            benchmark.len(),
            prices.n_days()
        )));
    }
    let rows = params.time_horizon_years as usize * config.trading_days_per_year;
    let window = prices.tail(rows);
    let offset = prices.n_days() - window.n_days();
    let backtest_params = BacktestParams::new(params.investment)
        .with_monthly_contribution(params.monthly_contribution)
        .with_trading_days(config.trading_days_per_year);
    run_backtest(&window, weights, &benchmark[offset..], &backtest_params)
}

