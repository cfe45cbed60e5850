//! Risk analytics over an allocation: VaR, correlation, risk contribution
//! and stress tests.

mod contribution;
mod correlation;
mod stress;
mod var;

pub use contribution::{labeled_contributions, risk_contributions, RiskContribution};
pub use correlation::{correlation_matrix, labeled_correlation, CorrelationTable};
pub use stress::{
    standard_stress_tests, stress_test, worst_case, StressScenario, STANDARD_CRASHES,
};
pub use var::{
    historical_var, parametric_var, z_score, HistoricalVar, VarResult, Z_SCORE_90, Z_SCORE_95,
    Z_SCORE_99,
};
