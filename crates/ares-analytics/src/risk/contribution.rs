//! Risk contribution analysis.
//!
//! Splits portfolio variance into per-asset shares:
//!
//! ```text
//! RCᵢ = wᵢ·(Σw)ᵢ / (wᵀΣw) × 100
//! ```
//!
//! The shares sum to 100% by construction (Euler decomposition).

use ares_core::{Ticker, TickerIndex};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::error::{AnalyticsError, AnalyticsResult};

/// Share of portfolio variance attributable to one asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskContribution {
    /// Asset ticker.
    pub ticker: Ticker,
    /// Contribution as percentage of total variance (0-100 for long-only).
    pub contribution: f64,
}

/// Percent variance contributions by position.
pub fn risk_contributions(weights: &[f64], covariance: &DMatrix<f64>) -> AnalyticsResult<Vec<f64>> {
    let n = weights.len();
    if covariance.shape() != (n, n) {
        return Err(AnalyticsError::dimension_mismatch(format!(
            "{n} weights against {}x{} covariance",
            covariance.nrows(),
            covariance.ncols()
        )));
    }
    let w = DVector::from_column_slice(weights);
    let marginal = covariance * &w;
    let variance = w.dot(&marginal);
    if !(variance > 0.0) {
        return Err(AnalyticsError::invalid_input(
            "portfolio variance is zero; contributions are undefined",
        ));
    }
    Ok(w.component_mul(&marginal)
        .iter()
        .map(|c| c / variance * 100.0)
        .collect())
}

/// Contributions labeled by ticker, largest first.
pub fn labeled_contributions(
    weights: &[f64],
    covariance: &DMatrix<f64>,
    index: &TickerIndex,
) -> AnalyticsResult<Vec<RiskContribution>> {
    let values = risk_contributions(weights, covariance)?;
    let mut labeled: Vec<RiskContribution> = index
        .label(&values)?
        .into_iter()
        .map(|(ticker, contribution)| RiskContribution {
            ticker,
            contribution,
        })
        .collect();
    labeled.sort_by(|a, b| {
        b.contribution
            .total_cmp(&a.contribution)
            .then_with(|| a.ticker.cmp(&b.ticker))
    });
    Ok(labeled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_uncorrelated_equal_weight() {
        // Variances 1 and 3 -> shares 25% and 75%.
        let cov = DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, 3.0]);
        let rc = risk_contributions(&[0.5, 0.5], &cov).unwrap();
        assert_relative_eq!(rc[0], 25.0, epsilon = 1e-12);
        assert_relative_eq!(rc[1], 75.0, epsilon = 1e-12);
    }

    #[test]
    fn test_sorted_and_sums_to_100() {
        let cov = DMatrix::from_row_slice(
            3,
            3,
            &[0.04, 0.006, 0.002, 0.006, 0.09, 0.009, 0.002, 0.009, 0.0225],
        );
        let index = TickerIndex::new(
            ["A", "B", "C"].iter().map(|t| Ticker::parse(t).unwrap()).collect(),
        )
        .unwrap();
        let rc = labeled_contributions(&[0.3, 0.3, 0.4], &cov, &index).unwrap();
        assert_relative_eq!(rc.iter().map(|c| c.contribution).sum::<f64>(), 100.0, epsilon = 1e-9);
        assert!(rc.windows(2).all(|w| w[0].contribution >= w[1].contribution));
        assert_eq!(rc[0].ticker.as_str(), "B");
    }

    #[test]
    fn test_zero_variance_rejected() {
        let cov = DMatrix::zeros(2, 2);
        assert!(risk_contributions(&[0.5, 0.5], &cov).is_err());
    }
}
