//! Daily returns from aligned prices.

use ares_core::{Date, PriceMatrix, TickerIndex};
use nalgebra::{DMatrix, DVector};

use crate::error::{AnalyticsError, AnalyticsResult};

/// Simple daily returns, rows = days, columns = tickers.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnMatrix {
    index: TickerIndex,
    dates: Vec<Date>,
    values: DMatrix<f64>,
}

impl ReturnMatrix {
    /// Builds a return matrix directly from values.
    pub fn new(index: TickerIndex, dates: Vec<Date>, values: DMatrix<f64>) -> AnalyticsResult<Self> {
        if values.ncols() != index.len() || values.nrows() != dates.len() {
            return Err(AnalyticsError::dimension_mismatch(format!(
                "{}x{} returns for {} dates and {} tickers",
                values.nrows(),
                values.ncols(),
                dates.len(),
                index.len()
            )));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(AnalyticsError::invalid_input("returns must be finite"));
        }
        Ok(Self {
            index,
            dates,
            values,
        })
    }

    /// The ticker table.
    #[must_use]
    pub fn index(&self) -> &TickerIndex {
        &self.index
    }

    /// Date of each return (the later of the two prices).
    #[must_use]
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Returns, rows = days, columns = tickers.
    #[must_use]
    pub fn values(&self) -> &DMatrix<f64> {
        &self.values
    }

    /// Number of return observations.
    #[must_use]
    pub fn n_periods(&self) -> usize {
        self.values.nrows()
    }

    /// Number of tickers.
    #[must_use]
    pub fn n_assets(&self) -> usize {
        self.values.ncols()
    }

    /// Daily returns of a fixed-weight portfolio.
    pub fn portfolio_returns(&self, weights: &[f64]) -> AnalyticsResult<Vec<f64>> {
        if weights.len() != self.n_assets() {
            return Err(AnalyticsError::dimension_mismatch(format!(
                "{} weights for {} assets",
                weights.len(),
                self.n_assets()
            )));
        }
        let w = DVector::from_column_slice(weights);
        Ok((&self.values * w).iter().copied().collect())
    }
}

/// Converts aligned prices into simple daily returns `pₜ/pₜ₋₁ − 1`.
///
/// # Errors
///
/// - `AnalyticsError::BelowMinimumAssets` if there are no tickers
/// - `AnalyticsError::InsufficientData` if fewer than `min_trading_days`
///   aligned days exist; the error names the ticker whose history starts
///   latest, since it bounds the window
pub fn compute_returns(prices: &PriceMatrix, min_trading_days: usize) -> AnalyticsResult<ReturnMatrix> {
    if prices.n_assets() == 0 {
        return Err(AnalyticsError::BelowMinimumAssets {
            available: 0,
            required: 1,
        });
    }
    let required = min_trading_days.max(2);
    if prices.n_days() < required {
        let ticker = prices
            .latest_start()
            .map_or_else(|| "<unknown>".to_string(), ToString::to_string);
        return Err(AnalyticsError::InsufficientData {
            ticker,
            available: prices.n_days(),
            required,
        });
    }

    let p = prices.prices();
    let rows = p.nrows() - 1;
    let values = DMatrix::from_fn(rows, p.ncols(), |r, c| p[(r + 1, c)] / p[(r, c)] - 1.0);
    ReturnMatrix::new(prices.index().clone(), prices.dates()[1..].to_vec(), values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ares_core::Ticker;
    use approx::assert_relative_eq;

    fn dates(n: usize) -> Vec<Date> {
        let start = Date::from_ymd(2024, 1, 1).unwrap();
        (0..n).map(|i| start.add_days(i as i64)).collect()
    }

    fn matrix(columns: Vec<Vec<f64>>) -> PriceMatrix {
        let n = columns[0].len();
        let tickers = (0..columns.len())
            .map(|i| Ticker::parse(&format!("T{i}")).unwrap())
            .collect();
        PriceMatrix::from_columns(dates(n), tickers, columns).unwrap()
    }

    #[test]
    fn test_simple_returns() {
        let prices = matrix(vec![vec![100.0, 110.0, 99.0], vec![50.0, 50.0, 55.0]]);
        let returns = compute_returns(&prices, 2).unwrap();
        assert_eq!(returns.n_periods(), 2);
        assert_relative_eq!(returns.values()[(0, 0)], 0.10, epsilon = 1e-12);
        assert_relative_eq!(returns.values()[(1, 0)], -0.10, epsilon = 1e-12);
        assert_relative_eq!(returns.values()[(1, 1)], 0.10, epsilon = 1e-12);
        assert_eq!(returns.dates()[0], dates(3)[1]);
    }

    #[test]
    fn test_insufficient_data_names_ticker() {
        let prices = matrix(vec![vec![1.0; 10], vec![2.0; 10]]);
        let err = compute_returns(&prices, 30).unwrap_err();
        match err {
            AnalyticsError::InsufficientData {
                ticker,
                available,
                required,
            } => {
                assert!(ticker.starts_with('T'));
                assert_eq!(available, 10);
                assert_eq!(required, 30);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_portfolio_returns() {
        let prices = matrix(vec![vec![100.0, 110.0], vec![100.0, 90.0]]);
        let returns = compute_returns(&prices, 2).unwrap();
        let port = returns.portfolio_returns(&[0.5, 0.5]).unwrap();
        assert_relative_eq!(port[0], 0.0, epsilon = 1e-12);
        assert!(returns.portfolio_returns(&[1.0]).is_err());
    }
}
