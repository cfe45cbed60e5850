//! Covariance and expected-return estimation.

mod covariance;
mod expected_returns;

pub use covariance::{estimate_covariance, sample_covariance, CovarianceEstimate};
pub use expected_returns::expected_returns;
