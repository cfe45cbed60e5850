//! CLI command implementations.

pub mod frontier;
pub mod optimize;
pub mod risk;
pub mod universe;

// Re-export submodules for convenience
pub use frontier::FrontierArgs;
pub use optimize::OptimizeArgs;
pub use risk::RiskArgs;
pub use universe::UniverseArgs;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;

use ares_core::Date;
use ares_engine::{AllocationEngine, EngineSettings};
use ares_ext_file::CsvPriceSource;

use crate::error::{CliError, CliResult};

/// Where prices come from and which tickers to use.
#[derive(Args, Debug)]
pub struct MarketArgs {
    /// Directory of <TICKER>.csv files with date,close columns
    #[arg(short, long, env = "ARES_PRICES")]
    pub prices: PathBuf,

    /// Comma-separated ticker list
    #[arg(short, long, value_delimiter = ',', num_args = 1..)]
    pub tickers: Vec<String>,

    /// Benchmark ticker for the backtest
    #[arg(short, long, env = "ARES_BENCHMARK", default_value = "SPY")]
    pub benchmark: String,

    /// Time horizon in years
    #[arg(long, default_value = "5")]
    pub horizon: u32,

    /// End of the history window (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    pub as_of: Option<String>,
}

impl MarketArgs {
    /// Builds an engine over the CSV directory.
    pub fn engine(&self) -> CliResult<AllocationEngine> {
        let mut settings = EngineSettings::default().with_benchmark(&self.benchmark);
        if let Some(ref s) = self.as_of {
            settings = settings.with_as_of(parse_date(s)?);
        }
        tracing::debug!(prices = %self.prices.display(), benchmark = %self.benchmark, "opening price directory");
        let source = CsvPriceSource::new(&self.prices)?;
        Ok(AllocationEngine::new(Arc::new(source), settings)?)
    }
}

/// Parses a date string in YYYY-MM-DD format.
pub fn parse_date(s: &str) -> CliResult<Date> {
    Date::parse(s).map_err(|_| CliError::InvalidDate(s.to_string()))
}
