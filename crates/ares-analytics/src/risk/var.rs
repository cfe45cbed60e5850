//! Value at Risk.
//!
//! Parametric VaR assumes normally distributed portfolio returns with zero
//! mean over the horizon:
//!
//! ```text
//! VaR = investment × z(c) × √(wᵀΣw)
//! ```
//!
//! Historical VaR reads the loss quantile straight off realized returns.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

use crate::error::{AnalyticsError, AnalyticsResult};

/// One-tailed z-score at 90% confidence.
pub const Z_SCORE_90: f64 = 1.282;
/// One-tailed z-score at 95% confidence.
pub const Z_SCORE_95: f64 = 1.645;
/// One-tailed z-score at 99% confidence.
pub const Z_SCORE_99: f64 = 2.326;

/// One-tailed standard normal quantile for `confidence`.
///
/// The common levels use the tabulated values; anything else in (0.5, 1)
/// goes through the inverse normal CDF.
pub fn z_score(confidence: f64) -> AnalyticsResult<f64> {
    if !(confidence > 0.5 && confidence < 1.0) {
        return Err(AnalyticsError::invalid_input(format!(
            "VaR confidence must be in (0.5, 1), got {confidence}"
        )));
    }
    let table = [(0.90, Z_SCORE_90), (0.95, Z_SCORE_95), (0.99, Z_SCORE_99)];
    if let Some(&(_, z)) = table.iter().find(|(c, _)| (confidence - c).abs() < 1e-12) {
        return Ok(z);
    }
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AnalyticsError::invalid_input(format!("standard normal: {e}")))?;
    Ok(normal.inverse_cdf(confidence))
}

/// Parametric VaR in currency units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VarResult {
    /// One-day VaR.
    pub daily_var: f64,
    /// One-year VaR.
    pub annual_var: f64,
    /// Confidence level used.
    pub confidence: f64,
}

/// Parametric VaR of `weights` from daily and annual covariance.
///
/// # Errors
///
/// - `AnalyticsError::DimensionMismatch` if shapes disagree
/// - `AnalyticsError::InvalidInput` for a bad confidence or investment
pub fn parametric_var(
    weights: &[f64],
    daily_covariance: &DMatrix<f64>,
    annual_covariance: &DMatrix<f64>,
    investment: f64,
    confidence: f64,
) -> AnalyticsResult<VarResult> {
    let n = weights.len();
    if daily_covariance.shape() != (n, n) || annual_covariance.shape() != (n, n) {
        return Err(AnalyticsError::dimension_mismatch(format!(
            "{n} weights against {}x{} covariance",
            daily_covariance.nrows(),
            daily_covariance.ncols()
        )));
    }
    if !(investment.is_finite() && investment >= 0.0) {
        return Err(AnalyticsError::invalid_input(format!(
            "investment must be non-negative, got {investment}"
        )));
    }
    let z = z_score(confidence)?;
    let w = DVector::from_column_slice(weights);
    let daily_vol = w.dot(&(daily_covariance * &w)).max(0.0).sqrt();
    let annual_vol = w.dot(&(annual_covariance * &w)).max(0.0).sqrt();

    Ok(VarResult {
        daily_var: investment * z * daily_vol,
        annual_var: investment * z * annual_vol,
        confidence,
    })
}

/// Historical one-day VaR.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoricalVar {
    /// One-day VaR in currency units.
    pub daily_var: f64,
    /// Confidence level used.
    pub confidence: f64,
    /// Number of returns the quantile was read from.
    pub observations: usize,
}

/// Historical VaR from realized daily portfolio returns.
///
/// Returns are sorted worst first and the loss at index
/// `floor((1 − c)·n)` is taken.
pub fn historical_var(returns: &[f64], investment: f64, confidence: f64) -> AnalyticsResult<HistoricalVar> {
    if returns.is_empty() {
        return Err(AnalyticsError::invalid_input("no returns provided"));
    }
    if !(confidence > 0.0 && confidence < 1.0) {
        return Err(AnalyticsError::invalid_input(
            "confidence level must be between 0 and 1",
        ));
    }

    let mut sorted = returns.to_vec();
    sorted.sort_by(f64::total_cmp);
    let index = (((1.0 - confidence) * sorted.len() as f64).floor() as usize).min(sorted.len() - 1);
    let quantile = sorted[index];

    Ok(HistoricalVar {
        daily_var: (-quantile * investment).max(0.0),
        confidence,
        observations: sorted.len(),
    })
}
