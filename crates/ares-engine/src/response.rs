//! Response contract.

use std::collections::BTreeMap;

use ares_analytics::backtest::BacktestResult;
use ares_analytics::optimization::{FrontierPoint, OptimizationMethod};
use ares_analytics::risk::{CorrelationTable, HistoricalVar, RiskContribution, StressScenario, VarResult};
use ares_analytics::strategy::Strategy;
use ares_analytics::{AllocationParams, PortfolioAnalysis};
use ares_core::types::DroppedSeries;
use ares_core::Ticker;
use serde::{Deserialize, Serialize};

/// The optimal allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationSummary {
    /// Weight per ticker.
    pub weights: BTreeMap<Ticker, f64>,
    /// Annualized expected return.
    pub expected_return: f64,
    /// Annualized volatility.
    pub volatility: f64,
    /// Sharpe ratio.
    pub sharpe_ratio: f64,
    /// Strategy label.
    pub strategy: Strategy,
    /// How the weights were obtained.
    pub method: OptimizationMethod,
}

/// Full response to an optimization request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizeResponse {
    /// Tickers that made it into the optimization.
    pub valid_tickers: Vec<Ticker>,
    /// Requested tickers that had no data or too little coverage.
    pub dropped_tickers: Vec<DroppedSeries>,
    /// The allocation.
    pub optimization: OptimizationSummary,
    /// Efficient frontier.
    pub efficient_frontier: Vec<FrontierPoint>,
    /// Parametric VaR.
    pub var: VarResult,
    /// Historical one-day VaR.
    pub historical_var: HistoricalVar,
    /// Backtest against the benchmark.
    pub backtest: BacktestResult,
    /// Pairwise correlations.
    pub correlation_matrix: CorrelationTable,
    /// Variance shares, largest first.
    pub contribution_to_risk: Vec<RiskContribution>,
    /// Configured crash scenario.
    pub stress_test: StressScenario,
    /// Standard crash ladder.
    pub stress_scenarios: Vec<StressScenario>,
    /// Echoed investment.
    pub investment: f64,
    /// Echoed risk tolerance.
    pub risk_tolerance: f64,
}

impl OptimizeResponse {
    /// Builds the response from a finished analysis.
    #[must_use]
    pub fn from_analysis(
        analysis: PortfolioAnalysis,
        params: &AllocationParams,
        dropped_tickers: Vec<DroppedSeries>,
    ) -> Self {
        let weights = analysis
            .index
            .tickers()
            .iter()
            .cloned()
            .zip(analysis.portfolio.weights.iter().copied())
            .collect();
        let performance = analysis.portfolio.performance;
        Self {
            valid_tickers: analysis.index.tickers().to_vec(),
            dropped_tickers,
            optimization: OptimizationSummary {
                weights,
                expected_return: performance.expected_return,
                volatility: performance.volatility,
                sharpe_ratio: performance.sharpe_ratio,
                strategy: analysis.strategy,
                method: analysis.portfolio.method,
            },
            efficient_frontier: analysis.frontier,
            var: analysis.var,
            historical_var: analysis.historical_var,
            backtest: analysis.backtest,
            correlation_matrix: analysis.correlation,
            contribution_to_risk: analysis.contributions,
            stress_test: analysis.stress,
            stress_scenarios: analysis.stress_ladder,
            investment: params.investment,
            risk_tolerance: params.risk_tolerance,
        }
    }

    /// Risk-only view of the response.
    #[must_use]
    pub fn risk_details(&self) -> RiskDetails {
        RiskDetails {
            correlation_matrix: self.correlation_matrix.clone(),
            contribution_to_risk: self.contribution_to_risk.clone(),
            stress_test: self.stress_test,
            var: self.var,
        }
    }

    /// Backtest-only view of the response.
    #[must_use]
    pub fn backtest_report(&self) -> BacktestReport {
        BacktestReport {
            backtest: self.backtest.clone(),
            investment: self.investment,
        }
    }
}

/// Risk analytics without the allocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskDetails {
    /// Pairwise correlations.
    pub correlation_matrix: CorrelationTable,
    /// Variance shares.
    pub contribution_to_risk: Vec<RiskContribution>,
    /// Configured crash scenario.
    pub stress_test: StressScenario,
    /// Parametric VaR.
    pub var: VarResult,
}

/// Backtest with the investment it started from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestReport {
    /// Simulated series and summary statistics.
    pub backtest: BacktestResult,
    /// Initial investment.
    pub investment: f64,
}
