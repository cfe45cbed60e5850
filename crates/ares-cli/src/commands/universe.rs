//! Universe command implementation.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use ares_engine::universe::universe;
use ares_engine::Sector;

use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::output::{print_json, print_output};

/// Arguments for the universe command.
#[derive(Args, Debug)]
pub struct UniverseArgs {
    /// Restrict to one sector (case-insensitive)
    #[arg(short, long)]
    pub sector: Option<String>,
}

#[derive(Debug, Serialize, Tabled)]
struct SectorRow {
    #[tabled(rename = "Sector")]
    sector: String,
    #[tabled(rename = "Tickers")]
    tickers: String,
}

/// Execute the universe command.
pub fn execute(args: &UniverseArgs, format: OutputFormat) -> Result<()> {
    let sector = args
        .sector
        .as_deref()
        .map(str::parse::<Sector>)
        .transpose()
        .map_err(CliError::from)?;
    let groups = universe(sector);

    if format == OutputFormat::Json {
        return print_json(&groups);
    }

    let rows: Vec<SectorRow> = groups
        .into_iter()
        .map(|(name, tickers)| SectorRow {
            sector: name.to_string(),
            tickers: tickers.join(" "),
        })
        .collect();
    print_output(&rows, format)
}
