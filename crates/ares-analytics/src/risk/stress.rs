//! Uniform crash stress tests.

use serde::{Deserialize, Serialize};

use crate::error::{AnalyticsError, AnalyticsResult};

/// Crash sizes run by [`standard_stress_tests`].
pub const STANDARD_CRASHES: [f64; 4] = [-0.10, -0.20, -0.30, -0.40];

/// Portfolio valuation under a uniform market crash.
///
/// Percentages are fractions: `-0.2` is a 20% crash.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StressScenario {
    /// Crash applied to every asset.
    pub crash_scenario_pct: f64,
    /// Resulting portfolio return.
    pub portfolio_return_crash: f64,
    /// Value before the crash.
    pub value_before: f64,
    /// Value after the crash.
    pub value_after: f64,
    /// `value_before − value_after`.
    pub loss_usd: f64,
}

/// Applies crash `crash_pct` to every asset of a portfolio worth `value_before`.
///
/// With every asset down by the same fraction the portfolio return is the
/// weighted crash, which equals `crash_pct` for a fully invested portfolio.
pub fn stress_test(weights: &[f64], value_before: f64, crash_pct: f64) -> AnalyticsResult<StressScenario> {
    if !(crash_pct.is_finite() && crash_pct >= -1.0) {
        return Err(AnalyticsError::invalid_input(format!(
            "crash must be a fraction no lower than -1, got {crash_pct}"
        )));
    }
    if !(value_before.is_finite() && value_before >= 0.0) {
        return Err(AnalyticsError::invalid_input(format!(
            "portfolio value must be non-negative, got {value_before}"
        )));
    }
    if weights.is_empty() {
        return Err(AnalyticsError::invalid_input("no weights"));
    }
    let portfolio_return_crash: f64 = weights.iter().map(|w| w * crash_pct).sum();
    let value_after = value_before * (1.0 + portfolio_return_crash);
    Ok(StressScenario {
        crash_scenario_pct: crash_pct,
        portfolio_return_crash,
        value_before,
        value_after,
        loss_usd: value_before - value_after,
    })
}

/// Runs every crash in [`STANDARD_CRASHES`].
pub fn standard_stress_tests(weights: &[f64], value_before: f64) -> AnalyticsResult<Vec<StressScenario>> {
    STANDARD_CRASHES
        .iter()
        .map(|&crash| stress_test(weights, value_before, crash))
        .collect()
}

/// Scenario with the largest loss.
#[must_use]
pub fn worst_case(scenarios: &[StressScenario]) -> Option<&StressScenario> {
    scenarios.iter().max_by(|a, b| a.loss_usd.total_cmp(&b.loss_usd))
}
