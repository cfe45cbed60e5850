//! Annualized expected returns from historical daily returns.

use ares_core::config::ReturnEstimator;
use nalgebra::DVector;

use crate::error::{AnalyticsError, AnalyticsResult};
use crate::returns::ReturnMatrix;

/// Estimates annualized expected returns per ticker.
///
/// - `ArithmeticMean`: mean daily return × trading days
/// - `Compounded`: `(Π(1 + rₜ))^(days/T) − 1`
pub fn expected_returns(
    returns: &ReturnMatrix,
    estimator: ReturnEstimator,
    trading_days_per_year: usize,
) -> AnalyticsResult<DVector<f64>> {
    let x = returns.values();
    let t = x.nrows();
    if t == 0 {
        return Err(AnalyticsError::invalid_input("no return observations"));
    }
    let periods = trading_days_per_year as f64;

    let mu = match estimator {
        ReturnEstimator::ArithmeticMean => x.row_mean().transpose() * periods,
        ReturnEstimator::Compounded => DVector::from_fn(x.ncols(), |c, _| {
            let log_growth: f64 = x.column(c).iter().map(|r| r.ln_1p()).sum();
            (log_growth * periods / t as f64).exp_m1()
        }),
    };

    if let Some(i) = mu.iter().position(|v| !v.is_finite()) {
        return Err(AnalyticsError::invalid_input(format!(
            "non-finite expected return for {}",
            returns
                .index()
                .ticker(i)
                .map_or_else(|| format!("#{i}"), ToString::to_string)
        )));
    }
    Ok(mu)
}
