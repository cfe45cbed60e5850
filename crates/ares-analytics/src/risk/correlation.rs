//! Correlation matrix from a covariance estimate.

use std::collections::BTreeMap;

use ares_core::{Ticker, TickerIndex};
use ares_math::linear_algebra::covariance_to_correlation;
use nalgebra::DMatrix;

use crate::error::{AnalyticsError, AnalyticsResult};

/// Ticker-keyed correlation table, as served to clients.
pub type CorrelationTable = BTreeMap<Ticker, BTreeMap<Ticker, f64>>;

/// `corrᵢⱼ = Σᵢⱼ / √(Σᵢᵢ·Σⱼⱼ)`.
pub fn correlation_matrix(covariance: &DMatrix<f64>) -> AnalyticsResult<DMatrix<f64>> {
    covariance_to_correlation(covariance).map_err(|e| AnalyticsError::from_math("correlation", e))
}

/// Correlation matrix labeled by ticker on both axes.
pub fn labeled_correlation(
    covariance: &DMatrix<f64>,
    index: &TickerIndex,
) -> AnalyticsResult<CorrelationTable> {
    if covariance.nrows() != index.len() {
        return Err(AnalyticsError::dimension_mismatch(format!(
            "{}x{} covariance for {} tickers",
            covariance.nrows(),
            covariance.ncols(),
            index.len()
        )));
    }
    let corr = correlation_matrix(covariance)?;
    Ok(index
        .iter()
        .map(|(i, row)| {
            let cells = index
                .iter()
                .map(|(j, col)| (col.clone(), corr[(i, j)]))
                .collect();
            (row.clone(), cells)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_labeled_correlation() {
        let cov = DMatrix::from_row_slice(2, 2, &[0.01, 0.006, 0.006, 0.04]);
        let index = TickerIndex::new(vec![
            Ticker::parse("AAPL").unwrap(),
            Ticker::parse("MSFT").unwrap(),
        ])
        .unwrap();
        let table = labeled_correlation(&cov, &index).unwrap();
        let aapl = Ticker::parse("AAPL").unwrap();
        let msft = Ticker::parse("MSFT").unwrap();
        assert_relative_eq!(table[&aapl][&aapl], 1.0, epsilon = 1e-12);
        assert_relative_eq!(table[&aapl][&msft], 0.3, epsilon = 1e-12);
        assert_relative_eq!(table[&msft][&aapl], 0.3, epsilon = 1e-12);
    }

    #[test]
    fn test_size_mismatch() {
        let cov = DMatrix::identity(3, 3);
        let index = TickerIndex::new(vec![Ticker::parse("SPY").unwrap()]).unwrap();
        assert!(labeled_correlation(&cov, &index).is_err());
    }
}
