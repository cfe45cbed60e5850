//! CLI argument definitions.

use clap::{Parser, Subcommand, ValueEnum};

use crate::commands::{FrontierArgs, OptimizeArgs, RiskArgs, UniverseArgs};

/// Ares - Portfolio allocation and risk analytics CLI
#[derive(Parser)]
#[command(name = "ares")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Suppress warnings about dropped tickers
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Optimize a portfolio and report risk and backtest
    Optimize(OptimizeArgs),

    /// Trace the efficient frontier
    Frontier(FrontierArgs),

    /// Correlation, risk contribution, VaR and stress scenarios
    Risk(RiskArgs),

    /// List the curated ticker universe by sector
    Universe(UniverseArgs),
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// CSV format
    Csv,
}
