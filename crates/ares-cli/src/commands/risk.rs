//! Risk command implementation.
//!
//! Shows correlation, contribution to risk, VaR and the crash ladder of
//! the optimized allocation.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use ares_analytics::risk::StressScenario;
use ares_engine::{OptimizeRequest, RiskDetails};

use crate::cli::OutputFormat;
use crate::commands::MarketArgs;
use crate::error::CliError;
use crate::output::{
    format_percent, format_usd, print_dropped, print_header, print_json, print_matrix, print_output, KeyValue,
};

/// Arguments for the risk command.
#[derive(Args, Debug)]
pub struct RiskArgs {
    #[command(flatten)]
    pub market: MarketArgs,

    /// Portfolio value in USD
    #[arg(short, long, default_value = "100000")]
    pub investment: f64,

    /// Risk tolerance from 0 (conservative) to 1 (aggressive)
    #[arg(short, long, default_value = "0.5")]
    pub risk_tolerance: f64,
}

/// Risk details plus the full crash ladder.
#[derive(Debug, Serialize)]
struct RiskReport {
    #[serde(flatten)]
    details: RiskDetails,
    stress_scenarios: Vec<StressScenario>,
}

#[derive(Debug, Serialize, Tabled)]
struct ContributionRow {
    #[tabled(rename = "Ticker")]
    ticker: String,
    #[tabled(rename = "Share of Risk")]
    contribution: String,
}

#[derive(Debug, Serialize, Tabled)]
struct StressRow {
    #[tabled(rename = "Crash")]
    crash: String,
    #[tabled(rename = "Value After")]
    value_after: String,
    #[tabled(rename = "Loss")]
    loss: String,
}

/// Execute the risk command.
pub async fn execute(args: RiskArgs, format: OutputFormat, quiet: bool) -> Result<()> {
    let engine = args.market.engine()?;
    let request = OptimizeRequest::new(args.market.tickers.iter().cloned())
        .with_investment(args.investment)
        .with_risk_tolerance(args.risk_tolerance)
        .with_horizon(args.market.horizon);
    let response = engine.optimize(request).await.map_err(CliError::from)?;

    if !quiet {
        print_dropped(&response);
    }

    let report = RiskReport {
        details: response.risk_details(),
        stress_scenarios: response.stress_scenarios,
    };

    let contributions: Vec<ContributionRow> = report
        .details
        .contribution_to_risk
        .iter()
        .map(|c| ContributionRow {
            ticker: c.ticker.to_string(),
            contribution: format!("{:.2}%", c.contribution),
        })
        .collect();

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Csv => print_output(&contributions, format)?,
        OutputFormat::Table => {
            let labels: Vec<String> = report
                .details
                .correlation_matrix
                .keys()
                .map(ToString::to_string)
                .collect();
            let values: Vec<Vec<f64>> = report
                .details
                .correlation_matrix
                .values()
                .map(|row| row.values().copied().collect())
                .collect();
            print_header("Correlation");
            print_matrix(&labels, &values);

            print_header("Contribution to Risk");
            print_output(&contributions, format)?;

            let var = &report.details.var;
            print_header("Value at Risk");
            print_output(
                &[
                    KeyValue::new("Confidence", format!("{:.0}%", var.confidence * 100.0)),
                    KeyValue::from_usd("Daily VaR", var.daily_var),
                    KeyValue::from_usd("Annual VaR", var.annual_var),
                ],
                format,
            )?;

            let stress: Vec<StressRow> = report
                .stress_scenarios
                .iter()
                .map(|s| StressRow {
                    crash: format_percent(s.crash_scenario_pct),
                    value_after: format_usd(s.value_after),
                    loss: format_usd(s.loss_usd),
                })
                .collect();
            print_header("Stress Scenarios");
            print_output(&stress, format)?;
        }
    }

    Ok(())
}
