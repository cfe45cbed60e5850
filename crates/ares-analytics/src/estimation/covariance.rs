//! Shrinkage covariance estimation.
//!
//! The sample covariance of a few hundred daily returns is noisy and, with
//! many assets, badly conditioned. Ledoit and Wolf blend it with a
//! structured target using the intensity that minimizes expected quadratic
//! loss:
//!
//! ```text
//! Σ̂ = δ·F + (1 − δ)·S,    δ = clamp((π̂ − ρ̂) / γ̂ / T, 0, 1)
//! ```

use ares_core::config::ShrinkageTarget;
use nalgebra::{DMatrix, DVector};
use serde::Serialize;

use crate::error::{AnalyticsError, AnalyticsResult};
use crate::returns::ReturnMatrix;

/// Daily variance at or below which an asset is treated as flat.
const MIN_VARIANCE: f64 = 1e-18;

/// A shrunk covariance matrix in daily and annual units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CovarianceEstimate {
    /// Daily covariance.
    #[serde(skip)]
    pub daily: DMatrix<f64>,
    /// Annualized covariance.
    #[serde(skip)]
    pub annual: DMatrix<f64>,
    /// Shrinkage intensity applied, in [0, 1].
    pub shrinkage: f64,
    /// Target the sample was shrunk toward.
    pub target: ShrinkageTarget,
}

/// Estimates the covariance of `returns`.
///
/// # Errors
///
/// - `AnalyticsError::InsufficientData` with fewer than two observations
/// - `AnalyticsError::DegenerateCovariance` if an asset has zero variance
pub fn estimate_covariance(
    returns: &ReturnMatrix,
    target: ShrinkageTarget,
    trading_days_per_year: usize,
) -> AnalyticsResult<CovarianceEstimate> {
    let x = returns.values();
    if x.nrows() < 2 {
        return Err(AnalyticsError::InsufficientData {
            ticker: returns
                .index()
                .ticker(0)
                .map_or_else(|| "<none>".to_string(), ToString::to_string),
            available: x.nrows(),
            required: 2,
        });
    }

    let sample = sample_covariance(x);
    if let Some(i) = (0..sample.nrows()).find(|&i| !(sample[(i, i)] > MIN_VARIANCE)) {
        return Err(AnalyticsError::DegenerateCovariance {
            ticker: returns
                .index()
                .ticker(i)
                .map_or_else(|| format!("#{i}"), ToString::to_string),
        });
    }

    let (daily, shrinkage) = match target {
        ShrinkageTarget::ConstantCorrelation => constant_correlation(x, &sample),
        ShrinkageTarget::ConstantVariance => constant_variance(x, &sample),
        ShrinkageTarget::None => (sample, 0.0),
    };
    tracing::debug!(?target, shrinkage, "covariance estimated");

    let annual = &daily * trading_days_per_year as f64;
    Ok(CovarianceEstimate {
        daily,
        annual,
        shrinkage,
        target,
    })
}

/// Sample covariance with divisor `T − 1`.
#[must_use]
pub fn sample_covariance(x: &DMatrix<f64>) -> DMatrix<f64> {
    let t = x.nrows() as f64;
    let centered = demean(x);
    centered.transpose() * &centered / (t - 1.0)
}

fn demean(x: &DMatrix<f64>) -> DMatrix<f64> {
    let means: DVector<f64> = x.row_mean().transpose();
    DMatrix::from_fn(x.nrows(), x.ncols(), |r, c| x[(r, c)] - means[c])
}

/// Ledoit-Wolf (2004) shrinkage toward the constant-correlation target.
fn constant_correlation(x: &DMatrix<f64>, sample: &DMatrix<f64>) -> (DMatrix<f64>, f64) {
    let n = sample.nrows();
    if n < 2 {
        return (sample.clone(), 0.0);
    }
    let t = x.nrows() as f64;
    let var: Vec<f64> = (0..n).map(|i| sample[(i, i)]).collect();
    let std: Vec<f64> = var.iter().map(|v| v.sqrt()).collect();

    let mut corr_sum = 0.0;
    for i in 0..n {
        for j in 0..n {
            if i != j {
                corr_sum += sample[(i, j)] / (std[i] * std[j]);
            }
        }
    }
    let r_bar = corr_sum / (n * (n - 1)) as f64;
    let target = DMatrix::from_fn(n, n, |i, j| {
        if i == j {
            var[i]
        } else {
            r_bar * std[i] * std[j]
        }
    });

    let xm = demean(x);
    let y = xm.map(|v| v * v);
    let cross = xm.transpose() * &xm;
    let pi_mat = DMatrix::from_fn(n, n, |i, j| {
        let fourth: f64 = y.column(i).dot(&y.column(j)) / t;
        fourth - 2.0 * cross[(i, j)] * sample[(i, j)] / t + sample[(i, j)].powi(2)
    });
    let pi_hat = pi_mat.sum();

    let cubed = xm.map(|v| v * v * v);
    let term1 = cubed.transpose() * &xm / t;
    let help = &cross / t;
    let mut rho_off = 0.0;
    for i in 0..n {
        for j in 0..n {
            if i == j {
                continue;
            }
            let theta = term1[(i, j)] - help[(i, i)] * sample[(i, j)] - help[(i, j)] * var[i]
                + var[i] * sample[(i, j)];
            rho_off += std[j] / std[i] * theta;
        }
    }
    let rho_hat = pi_mat.diagonal().sum() + r_bar * rho_off;

    let gamma_hat = (sample - &target).norm_squared();
    let shrinkage = if gamma_hat <= 1e-20 * sample.norm_squared() {
        0.0
    } else {
        ((pi_hat - rho_hat) / gamma_hat / t).clamp(0.0, 1.0)
    };

    (&target * shrinkage + sample * (1.0 - shrinkage), shrinkage)
}

/// Ledoit-Wolf shrinkage toward a scaled identity.
fn constant_variance(x: &DMatrix<f64>, sample: &DMatrix<f64>) -> (DMatrix<f64>, f64) {
    let n = sample.nrows();
    let nf = n as f64;
    let t = x.nrows() as f64;
    let xm = demean(x);
    let x2 = xm.map(|v| v * v);

    let emp_var: Vec<f64> = (0..n).map(|i| x2.column(i).sum() / t).collect();
    let mu = emp_var.iter().sum::<f64>() / nf;

    let beta_raw = (x2.transpose() * &x2).sum();
    let cross = xm.transpose() * &xm;
    let delta_raw = cross.map(|v| v * v).sum() / (t * t);

    let beta = (beta_raw / t - delta_raw) / (nf * t);
    let delta = (delta_raw - 2.0 * mu * emp_var.iter().sum::<f64>() + nf * mu * mu) / nf;
    let beta = beta.min(delta);
    let shrinkage = if beta <= 0.0 || delta <= 0.0 {
        0.0
    } else {
        (beta / delta).clamp(0.0, 1.0)
    };

    let avg_var = sample.diagonal().mean();
    let target = DMatrix::identity(n, n) * avg_var;
    (&target * shrinkage + sample * (1.0 - shrinkage), shrinkage)
}
