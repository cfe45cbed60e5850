//! Discrete strategy labels.

use std::fmt;

use ares_core::config::StrategyBasis;
use serde::{Deserialize, Serialize};

/// Highest risk tolerance still labeled conservative.
pub const CONSERVATIVE_TOLERANCE: f64 = 0.33;
/// Highest risk tolerance still labeled balanced.
pub const BALANCED_TOLERANCE: f64 = 0.66;
/// Highest annual volatility still labeled conservative.
pub const CONSERVATIVE_VOLATILITY: f64 = 0.12;
/// Highest annual volatility still labeled balanced.
pub const BALANCED_VOLATILITY: f64 = 0.20;

/// Portfolio style label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    /// Low risk.
    Conservative,
    /// Moderate risk.
    Balanced,
    /// High risk.
    Aggressive,
}

impl Strategy {
    /// Label from a requested risk tolerance in [0, 1].
    #[must_use]
    pub fn from_risk_tolerance(risk_tolerance: f64) -> Self {
        bucket(risk_tolerance, CONSERVATIVE_TOLERANCE, BALANCED_TOLERANCE)
    }

    /// Label from realized annual volatility.
    #[must_use]
    pub fn from_volatility(volatility: f64) -> Self {
        bucket(volatility, CONSERVATIVE_VOLATILITY, BALANCED_VOLATILITY)
    }

    /// Label according to `basis`.
    #[must_use]
    pub fn classify(basis: StrategyBasis, risk_tolerance: f64, volatility: f64) -> Self {
        match basis {
            StrategyBasis::RiskTolerance => Self::from_risk_tolerance(risk_tolerance),
            StrategyBasis::Volatility => Self::from_volatility(volatility),
        }
    }

    /// Display name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Conservative => "Conservative",
            Self::Balanced => "Balanced",
            Self::Aggressive => "Aggressive",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn bucket(value: f64, conservative: f64, balanced: f64) -> Strategy {
    if value <= conservative {
        Strategy::Conservative
    } else if value <= balanced {
        Strategy::Balanced
    } else {
        Strategy::Aggressive
    }
}
