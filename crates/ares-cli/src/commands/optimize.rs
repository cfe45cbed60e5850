//! Optimize command implementation.
//!
//! Runs the full allocation pipeline for a ticker list.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use ares_engine::{OptimizeRequest, OptimizeResponse};

use crate::cli::OutputFormat;
use crate::commands::MarketArgs;
use crate::output::{format_percent, format_usd, print_dropped, print_header, print_json, print_output, KeyValue};

/// Arguments for the optimize command.
#[derive(Args, Debug)]
pub struct OptimizeArgs {
    #[command(flatten)]
    pub market: MarketArgs,

    /// Amount to invest in USD
    #[arg(short, long, default_value = "100000")]
    pub investment: f64,

    /// Risk tolerance from 0 (conservative) to 1 (aggressive)
    #[arg(short, long, default_value = "0.5")]
    pub risk_tolerance: f64,

    /// Monthly contribution in USD
    #[arg(short, long)]
    pub monthly_contribution: Option<f64>,

    /// Sectors to exclude, comma-separated
    #[arg(long, value_delimiter = ',')]
    pub exclude: Vec<String>,
}

impl OptimizeArgs {
    fn request(&self) -> OptimizeRequest {
        let mut request = OptimizeRequest::new(self.market.tickers.iter().cloned())
            .with_investment(self.investment)
            .with_risk_tolerance(self.risk_tolerance)
            .with_horizon(self.market.horizon)
            .with_excluded_sectors(self.exclude.iter().cloned());
        if let Some(amount) = self.monthly_contribution {
            request = request.with_monthly_contribution(amount);
        }
        request
    }
}

/// One row of the allocation table.
#[derive(Debug, Serialize, Tabled)]
struct AllocationRow {
    #[tabled(rename = "Ticker")]
    ticker: String,
    #[tabled(rename = "Weight")]
    weight: String,
    #[tabled(rename = "Amount")]
    amount: String,
}

/// Execute the optimize command.
pub async fn execute(args: OptimizeArgs, format: OutputFormat, quiet: bool) -> Result<()> {
    let engine = args.market.engine()?;
    let response = engine.optimize(args.request()).await.map_err(crate::error::CliError::from)?;

    if !quiet {
        print_dropped(&response);
    }

    match format {
        OutputFormat::Json => print_json(&response)?,
        OutputFormat::Csv => print_output(&allocation_rows(&response), format)?,
        OutputFormat::Table => {
            print_header("Allocation");
            print_output(&allocation_rows(&response), format)?;
            print_header("Portfolio");
            print_output(&summary(&response), format)?;
            print_header("Backtest");
            print_output(&backtest_summary(&response), format)?;
        }
    }

    Ok(())
}

fn allocation_rows(response: &OptimizeResponse) -> Vec<AllocationRow> {
    response
        .optimization
        .weights
        .iter()
        .map(|(ticker, &weight)| AllocationRow {
            ticker: ticker.to_string(),
            weight: format_percent(weight),
            amount: format_usd(weight * response.investment),
        })
        .collect()
}

fn summary(response: &OptimizeResponse) -> Vec<KeyValue> {
    let opt = &response.optimization;
    vec![
        KeyValue::new("Strategy", opt.strategy.to_string()),
        KeyValue::new("Method", format!("{:?}", opt.method)),
        KeyValue::from_percent("Expected Return", opt.expected_return),
        KeyValue::from_percent("Volatility", opt.volatility),
        KeyValue::new("Sharpe Ratio", format!("{:.3}", opt.sharpe_ratio)),
        KeyValue::from_usd(
            format!("Daily VaR ({:.0}%)", response.var.confidence * 100.0),
            response.var.daily_var,
        ),
        KeyValue::from_usd("Annual VaR", response.var.annual_var),
        KeyValue::from_usd("Historical Daily VaR", response.historical_var.daily_var),
    ]
}

fn backtest_summary(response: &OptimizeResponse) -> Vec<KeyValue> {
    let bt = &response.backtest;
    let mut rows = vec![
        KeyValue::new(
            "Period",
            match (bt.dates.first(), bt.dates.last()) {
                (Some(first), Some(last)) => format!("{first} to {last}"),
                _ => "-".to_string(),
            },
        ),
        KeyValue::from_usd("Total Invested", bt.total_invested),
        KeyValue::from_percent("Portfolio Total Return", bt.portfolio_total_return),
        KeyValue::from_percent("Benchmark Total Return", bt.benchmark_total_return),
        KeyValue::from_percent("Portfolio CAGR", bt.portfolio_cagr),
        KeyValue::from_percent("Benchmark CAGR", bt.benchmark_cagr),
        KeyValue::new("Max Drawdown", format!("{:.2}%", bt.max_drawdown_pct)),
    ];
    if let Some(amount) = bt.monthly_contribution {
        rows.insert(1, KeyValue::from_usd("Monthly Contribution", amount));
    }
    rows
}
