//! Ares CLI - Command-line interface for portfolio allocation.
//!
//! # Usage
//!
//! ```bash
//! # Optimize a portfolio from a directory of <TICKER>.csv files
//! ares optimize --prices data/prices --tickers AAPL,MSFT,JNJ --risk-tolerance 0.7
//!
//! # Efficient frontier as JSON
//! ares frontier --prices data/prices --tickers AAPL,MSFT,JNJ --format json
//!
//! # Risk breakdown
//! ares risk --prices data/prices --tickers AAPL,MSFT,JNJ --investment 250000
//!
//! # Curated universe
//! ares universe --sector energy
//! ```

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod error;
mod output;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so table and JSON output stay clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let format = cli.format;
    let quiet = cli.quiet;

    // Execute command
    match cli.command {
        Commands::Optimize(args) => commands::optimize::execute(args, format, quiet).await?,
        Commands::Frontier(args) => commands::frontier::execute(args, format).await?,
        Commands::Risk(args) => commands::risk::execute(args, format, quiet).await?,
        Commands::Universe(args) => commands::universe::execute(&args, format)?,
    }

    Ok(())
}
