//! Engine-level settings around the analytics configuration.

use ares_core::{Date, EngineConfig, Ticker};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Settings for data retrieval and concurrency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Benchmark ticker for backtests.
    pub benchmark: String,
    /// History requested is `max(time_horizon_years, history_years_floor)`.
    pub history_years_floor: u32,
    /// Concurrent optimizations; `None` uses the available cores.
    pub max_concurrent_optimizations: Option<usize>,
    /// Points returned by the frontier-only operation.
    pub frontier_endpoint_points: usize,
    /// Fixed "today" for history windows; `None` uses the wall clock.
    pub as_of: Option<Date>,
    /// Analytics configuration.
    pub engine: EngineConfig,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            benchmark: "SPY".to_string(),
            history_years_floor: 3,
            max_concurrent_optimizations: None,
            frontier_endpoint_points: 50,
            as_of: None,
            engine: EngineConfig::default(),
        }
    }
}

impl EngineSettings {
    /// Creates settings with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the benchmark ticker.
    #[must_use]
    pub fn with_benchmark(mut self, benchmark: impl Into<String>) -> Self {
        self.benchmark = benchmark.into();
        self
    }

    /// Sets the history floor in years.
    #[must_use]
    pub fn with_history_years_floor(mut self, years: u32) -> Self {
        self.history_years_floor = years;
        self
    }

    /// Sets the concurrency limit.
    #[must_use]
    pub fn with_max_concurrent(mut self, limit: usize) -> Self {
        self.max_concurrent_optimizations = Some(limit);
        self
    }

    /// Pins "today".
    #[must_use]
    pub fn with_as_of(mut self, date: Date) -> Self {
        self.as_of = Some(date);
        self
    }

    /// Replaces the analytics configuration.
    #[must_use]
    pub fn with_engine_config(mut self, config: EngineConfig) -> Self {
        self.engine = config;
        self
    }

    /// The benchmark as a parsed ticker.
    pub fn benchmark_ticker(&self) -> EngineResult<Ticker> {
        Ok(Ticker::parse(&self.benchmark)?)
    }

    /// Years of history to request for a horizon.
    #[must_use]
    pub fn history_years(&self, time_horizon_years: u32) -> u32 {
        time_horizon_years.max(self.history_years_floor)
    }

    /// First and last date of the history window for a horizon.
    ///
    /// The window ends on `as_of` (today when unset); nothing after it is
    /// ever loaded.
    pub fn history_window(&self, time_horizon_years: u32) -> EngineResult<(Date, Date)> {
        let years = i32::try_from(self.history_years(time_horizon_years))
            .map_err(|_| EngineError::validation("time_horizon_years", "too large"))?;
        let end = self.as_of.unwrap_or_else(Date::today);
        Ok((end.add_years(-years)?, end))
    }

    /// Checks the settings and the embedded configuration.
    pub fn validate(&self) -> EngineResult<()> {
        self.engine.validate()?;
        self.benchmark_ticker()?;
        if self.frontier_endpoint_points < 2 {
            return Err(EngineError::validation(
                "frontier_endpoint_points",
                "must be at least 2",
            ));
        }
        if self.max_concurrent_optimizations == Some(0) {
            return Err(EngineError::validation(
                "max_concurrent_optimizations",
                "must be positive",
            ));
        }
        Ok(())
    }
}
