//! Request contract and validation.

use ares_analytics::optimization::MIN_ASSETS;
use ares_analytics::{AllocationParams, AnalyticsError};
use ares_core::Ticker;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::universe::{exclude_sectors, Sector};

/// Smallest accepted investment.
pub const MIN_INVESTMENT: f64 = 1_000.0;
/// Largest accepted investment.
pub const MAX_INVESTMENT: f64 = 1_000_000_000.0;
/// Largest accepted backtest horizon in years.
pub const MAX_HORIZON_YEARS: u32 = 30;
/// Largest number of tickers in one request.
pub const MAX_TICKERS: usize = 30;

/// An optimization request as received from a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizeRequest {
    /// Ticker symbols, any case.
    pub tickers: Vec<String>,
    /// Portfolio value in USD.
    #[serde(default = "default_investment")]
    pub investment: f64,
    /// 0 = conservative, 1 = aggressive.
    #[serde(default = "default_risk_tolerance")]
    pub risk_tolerance: f64,
    /// Backtest horizon in years.
    #[serde(default = "default_horizon")]
    pub time_horizon_years: u32,
    /// Optional monthly contribution in USD.
    #[serde(default)]
    pub monthly_contribution: Option<f64>,
    /// Sectors whose tickers are removed before optimization.
    #[serde(default)]
    pub excluded_sectors: Vec<String>,
}

fn default_investment() -> f64 {
    100_000.0
}

fn default_risk_tolerance() -> f64 {
    0.5
}

fn default_horizon() -> u32 {
    5
}

impl OptimizeRequest {
    /// Request with default parameters.
    pub fn new<S: Into<String>>(tickers: impl IntoIterator<Item = S>) -> Self {
        Self {
            tickers: tickers.into_iter().map(Into::into).collect(),
            investment: default_investment(),
            risk_tolerance: default_risk_tolerance(),
            time_horizon_years: default_horizon(),
            monthly_contribution: None,
            excluded_sectors: Vec::new(),
        }
    }

    /// Sets the investment.
    #[must_use]
    pub fn with_investment(mut self, investment: f64) -> Self {
        self.investment = investment;
        self
    }

    /// Sets the risk tolerance.
    #[must_use]
    pub fn with_risk_tolerance(mut self, risk_tolerance: f64) -> Self {
        self.risk_tolerance = risk_tolerance;
        self
    }

    /// Sets the horizon.
    #[must_use]
    pub fn with_horizon(mut self, years: u32) -> Self {
        self.time_horizon_years = years;
        self
    }

    /// Sets the monthly contribution.
    #[must_use]
    pub fn with_monthly_contribution(mut self, amount: f64) -> Self {
        self.monthly_contribution = Some(amount);
        self
    }

    /// Sets excluded sectors.
    #[must_use]
    pub fn with_excluded_sectors<S: Into<String>>(mut self, sectors: impl IntoIterator<Item = S>) -> Self {
        self.excluded_sectors = sectors.into_iter().map(Into::into).collect();
        self
    }

    /// Normalizes and checks every field.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Validation` naming the first bad field, or a
    /// core `InvalidTicker` error for a malformed symbol.
    pub fn validate(&self) -> EngineResult<ValidatedRequest> {
        let excluded = self
            .excluded_sectors
            .iter()
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.parse::<Sector>())
            .collect::<EngineResult<Vec<_>>>()?;

        let requested = normalize_tickers(&self.tickers)?;
        if requested.len() < 2 {
            return Err(EngineError::validation(
                "tickers",
                format!("at least 2 unique tickers required, got {}", requested.len()),
            ));
        }
        let tickers = exclude_sectors(requested, &excluded);
        if tickers.len() < MIN_ASSETS {
            return Err(AnalyticsError::BelowMinimumAssets {
                available: tickers.len(),
                required: MIN_ASSETS,
            }
            .into());
        }
        if tickers.len() > MAX_TICKERS {
            return Err(EngineError::validation(
                "tickers",
                format!("at most {MAX_TICKERS} tickers allowed, got {}", tickers.len()),
            ));
        }
        if !(self.investment.is_finite()
            && (MIN_INVESTMENT..=MAX_INVESTMENT).contains(&self.investment))
        {
            return Err(EngineError::validation(
                "investment",
                format!("must be between {MIN_INVESTMENT} and {MAX_INVESTMENT}"),
            ));
        }
        if !(0.0..=1.0).contains(&self.risk_tolerance) {
            return Err(EngineError::validation("risk_tolerance", "must be in [0, 1]"));
        }
        if !(1..=MAX_HORIZON_YEARS).contains(&self.time_horizon_years) {
            return Err(EngineError::validation(
                "time_horizon_years",
                format!("must be between 1 and {MAX_HORIZON_YEARS}"),
            ));
        }
        let monthly_contribution = self.monthly_contribution.unwrap_or(0.0);
        if !(monthly_contribution.is_finite() && monthly_contribution >= 0.0) {
            return Err(EngineError::validation("monthly_contribution", "must be non-negative"));
        }

        Ok(ValidatedRequest {
            tickers,
            params: AllocationParams::new(self.investment, self.risk_tolerance, self.time_horizon_years)
                .with_monthly_contribution(monthly_contribution),
            excluded_sectors: excluded,
        })
    }
}

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    /// Unique normalized tickers, in request order.
    pub tickers: Vec<Ticker>,
    /// Numeric parameters.
    pub params: AllocationParams,
    /// Sectors that were filtered out.
    pub excluded_sectors: Vec<Sector>,
}

/// Trims, upper-cases, drops empties and removes duplicates (first wins).
pub fn normalize_tickers<S: AsRef<str>>(raw: &[S]) -> EngineResult<Vec<Ticker>> {
    let mut out: Vec<Ticker> = Vec::with_capacity(raw.len());
    for symbol in raw {
        let symbol = symbol.as_ref();
        if symbol.trim().is_empty() {
            continue;
        }
        let ticker = Ticker::parse(symbol)?;
        if !out.contains(&ticker) {
            out.push(ticker);
        }
    }
    Ok(out)
}

/// Splits a comma-separated query value such as `aapl, MSFT,,goog`.
pub fn parse_ticker_list(list: &str) -> EngineResult<Vec<Ticker>> {
    let parts: Vec<&str> = list.split(',').collect();
    let tickers = normalize_tickers(&parts)?;
    if tickers.len() < 2 {
        return Err(EngineError::validation("tickers", "at least 2 tickers required"));
    }
    Ok(tickers)
}
