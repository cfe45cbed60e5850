//! Synchronous orchestration with the convergence retry policy.
//!
//! A `NumericalConvergence` failure is retried once with the relaxed solver
//! budget; a second failure is returned as is.

use std::time::Instant;

use ares_analytics::optimization::FrontierPoint;
use ares_analytics::pipeline::{analyze_portfolio, frontier_only};
use ares_analytics::{AllocationParams, AnalyticsError, AnalyticsResult, PortfolioAnalysis};
use ares_core::{EngineConfig, PriceMatrix};

/// Runs `stage` with `config`, retrying once with a relaxed solver on a
/// convergence failure.
pub fn with_convergence_retry<T>(
    config: &EngineConfig,
    mut stage: impl FnMut(&EngineConfig) -> AnalyticsResult<T>,
) -> AnalyticsResult<T> {
    match stage(config) {
        Err(AnalyticsError::NumericalConvergence { stage: name, iterations }) => {
            tracing::warn!(
                stage = %name,
                iterations,
                "solver did not converge, retrying with relaxed tolerance"
            );
            let relaxed = config.clone().with_solver(config.solver.relaxed());
            stage(&relaxed)
        }
        other => other,
    }
}

/// Full allocation over aligned prices.
pub fn generate_portfolio(
    prices: &PriceMatrix,
    benchmark: &[f64],
    params: &AllocationParams,
    config: &EngineConfig,
    deadline: Option<Instant>,
) -> AnalyticsResult<PortfolioAnalysis> {
    with_convergence_retry(config, |cfg| {
        analyze_portfolio(prices, benchmark, params, cfg, deadline)
    })
}

/// Frontier only, with the same retry policy.
pub fn generate_frontier(
    prices: &PriceMatrix,
    points: usize,
    config: &EngineConfig,
    deadline: Option<Instant>,
) -> AnalyticsResult<Vec<FrontierPoint>> {
    with_convergence_retry(config, |cfg| frontier_only(prices, points, cfg, deadline))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ares_core::config::SolverBudget;

    #[test]
    fn test_retry_once_with_relaxed_budget() {
        let config = EngineConfig::default();
        let mut seen: Vec<SolverBudget> = Vec::new();
        let result = with_convergence_retry(&config, |cfg| {
            seen.push(cfg.solver);
            if seen.len() == 1 {
                Err(AnalyticsError::NumericalConvergence {
                    stage: "max_sharpe".into(),
                    iterations: 500,
                })
            } else {
                Ok(7)
            }
        });
        assert_eq!(result.unwrap(), 7);
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1], config.solver.relaxed());
    }

    #[test]
    fn test_second_failure_is_returned() {
        let config = EngineConfig::default();
        let mut calls = 0;
        let result: AnalyticsResult<()> = with_convergence_retry(&config, |_| {
            calls += 1;
            Err(AnalyticsError::NumericalConvergence {
                stage: "frontier".into(),
                iterations: 1000,
            })
        });
        assert!(matches!(result, Err(AnalyticsError::NumericalConvergence { .. })));
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_other_errors_not_retried() {
        let config = EngineConfig::default();
        let mut calls = 0;
        let result: AnalyticsResult<()> = with_convergence_retry(&config, |_| {
            calls += 1;
            Err(AnalyticsError::invalid_input("bad"))
        });
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }
}
