//! Frontier command implementation.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use ares_engine::normalize_tickers;

use crate::cli::OutputFormat;
use crate::commands::MarketArgs;
use crate::error::CliError;
use crate::output::{format_percent, print_csv, print_header, print_json, print_output};

/// Arguments for the frontier command.
#[derive(Args, Debug)]
pub struct FrontierArgs {
    #[command(flatten)]
    pub market: MarketArgs,
}

#[derive(Debug, Serialize, Tabled)]
struct FrontierRow {
    #[tabled(rename = "Return")]
    expected_return: String,
    #[tabled(rename = "Volatility")]
    volatility: String,
}

/// Execute the frontier command.
pub async fn execute(args: FrontierArgs, format: OutputFormat) -> Result<()> {
    let engine = args.market.engine()?;
    let tickers = normalize_tickers(&args.market.tickers).map_err(CliError::from)?;
    let frontier = engine
        .frontier(tickers, args.market.horizon)
        .await
        .map_err(CliError::from)?;

    match format {
        OutputFormat::Json => return print_json(&frontier),
        OutputFormat::Csv => return print_csv(&frontier),
        OutputFormat::Table => {}
    }

    let rows: Vec<FrontierRow> = frontier
        .iter()
        .map(|p| FrontierRow {
            expected_return: format_percent(p.expected_return),
            volatility: format_percent(p.volatility),
        })
        .collect();
    print_header("Efficient Frontier");
    print_output(&rows, format)
}
