//! Efficient frontier sweep.

use ares_core::EngineConfig;
use serde::{Deserialize, Serialize};

use super::optimizer::PortfolioOptimizer;
use crate::error::AnalyticsResult;
use crate::parallel::maybe_parallel_map;

/// One point of the efficient frontier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrontierPoint {
    /// Annualized target return.
    #[serde(rename = "return")]
    pub expected_return: f64,
    /// Annualized volatility of the minimum-variance portfolio at that return.
    pub volatility: f64,
}

/// Evenly spaced targets from `lower` to `upper` inclusive.
#[must_use]
pub fn frontier_targets(lower: f64, upper: f64, points: usize) -> Vec<f64> {
    if points <= 1 || upper <= lower {
        return vec![lower];
    }
    let step = (upper - lower) / (points - 1) as f64;
    (0..points)
        .map(|i| if i + 1 == points { upper } else { lower + step * i as f64 })
        .collect()
}

/// Traces the frontier with `config.frontier_points` targets.
pub fn efficient_frontier(
    optimizer: &PortfolioOptimizer,
    config: &EngineConfig,
) -> AnalyticsResult<Vec<FrontierPoint>> {
    efficient_frontier_with_points(optimizer, config.frontier_points, config)
}

/// Traces the frontier from the minimum-variance return up to the highest
/// single-asset expected return.
///
/// Targets that turn out infeasible, or whose solve does not converge, are
/// skipped. Any other error (a passed deadline, for one) aborts the sweep.
pub fn efficient_frontier_with_points(
    optimizer: &PortfolioOptimizer,
    points: usize,
    config: &EngineConfig,
) -> AnalyticsResult<Vec<FrontierPoint>> {
    let lower = optimizer.min_variance()?.performance.expected_return;
    let best_asset = optimizer
        .expected_returns()
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);
    let upper = best_asset.min(optimizer.return_range().max);

    let targets = frontier_targets(lower, upper, points);
    let solved = maybe_parallel_map(&targets, config, |&target| {
        optimizer.min_variance_for_target(target)
    });

    let mut frontier = Vec::with_capacity(targets.len());
    for (target, result) in targets.iter().zip(solved) {
        match result {
            Ok(portfolio) => frontier.push(FrontierPoint {
                expected_return: portfolio.performance.expected_return,
                volatility: portfolio.performance.volatility,
            }),
            Err(e) if e.is_skippable() => {
                tracing::debug!(target_return = *target, error = %e, "frontier point skipped");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(frontier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{DMatrix, DVector};

    fn optimizer(config: &EngineConfig) -> PortfolioOptimizer {
        let cov = DMatrix::from_row_slice(
            3,
            3,
            &[0.04, 0.006, 0.002, 0.006, 0.09, 0.009, 0.002, 0.009, 0.0225],
        );
        let mu = DVector::from_vec(vec![0.10, 0.15, 0.07]);
        PortfolioOptimizer::new(cov, mu, config).unwrap()
    }

    #[test]
    fn test_targets() {
        let t = frontier_targets(0.05, 0.15, 3);
        assert_eq!(t.len(), 3);
        assert_relative_eq!(t[1], 0.10, epsilon = 1e-15);
        assert_eq!(t[2], 0.15);
        assert_eq!(frontier_targets(0.2, 0.1, 30), vec![0.2]);
    }

    #[test]
    fn test_frontier_monotone() {
        let config = EngineConfig::default();
        let opt = optimizer(&config);
        let frontier = efficient_frontier(&opt, &config).unwrap();
        assert_eq!(frontier.len(), 30);
        for pair in frontier.windows(2) {
            assert!(pair[1].expected_return > pair[0].expected_return);
            assert!(pair[1].volatility >= pair[0].volatility - 1e-9);
        }
        assert_relative_eq!(frontier[29].expected_return, 0.15, epsilon = 1e-9);
        assert_relative_eq!(frontier[29].volatility, 0.3, epsilon = 1e-9);
    }

    #[test]
    fn test_frontier_with_cap_stops_at_achievable() {
        let config = EngineConfig::default().with_max_weight(0.5);
        let opt = optimizer(&config);
        let frontier = efficient_frontier_with_points(&opt, 10, &config).unwrap();
        let top = frontier.last().unwrap();
        assert!(top.expected_return <= opt.return_range().max + 1e-12);
    }

    #[test]
    fn test_serialized_field_names() {
        let point = FrontierPoint {
            expected_return: 0.1,
            volatility: 0.2,
        };
        let json = serde_json::to_string(&point).unwrap();
        assert_eq!(json, r#"{"return":0.1,"volatility":0.2}"#);
    }
}
