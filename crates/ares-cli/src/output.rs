//! Output formatting utilities.

use colored::Colorize;
use serde::Serialize;
use tabled::{
    builder::Builder,
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

use ares_engine::OptimizeResponse;

use crate::cli::OutputFormat;

/// Formats and prints rows based on the specified format.
pub fn print_output<T: Serialize + Tabled>(data: &[T], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Table => print_table(data),
        OutputFormat::Json => print_json(data),
        OutputFormat::Csv => print_csv(data),
    }
}

/// Prints any serializable value as pretty JSON.
pub fn print_json<T: Serialize + ?Sized>(data: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(data)?);
    Ok(())
}

/// Prints data as a formatted table.
fn print_table<T: Tabled>(data: &[T]) -> anyhow::Result<()> {
    if data.is_empty() {
        println!("No results.");
        return Ok(());
    }

    let table = Table::new(data)
        .with(Style::rounded())
        .with(Modify::new(Columns::first()).with(Alignment::left()))
        .to_string();

    println!("{}", table);
    Ok(())
}

/// Prints data as CSV.
pub fn print_csv<T: Serialize>(data: &[T]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(std::io::stdout());
    for item in data {
        wtr.serialize(item)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Prints a square matrix with labelled rows and columns.
pub fn print_matrix(labels: &[String], values: &[Vec<f64>]) {
    let mut builder = Builder::default();
    let mut header = vec![String::new()];
    header.extend(labels.iter().cloned());
    builder.push_record(header);
    for (label, row) in labels.iter().zip(values) {
        let mut record = vec![label.clone()];
        record.extend(row.iter().map(|v| format!("{v:.3}")));
        builder.push_record(record);
    }
    let table = builder.build().with(Style::rounded()).to_string();
    println!("{}", table);
}

/// Formats a fraction as a percentage string.
pub fn format_percent(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

/// Formats a dollar amount with thousands separators.
pub fn format_usd(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}${grouped}.{:02}", cents % 100)
}

/// Warns about requested tickers that were left out.
pub fn print_dropped(response: &OptimizeResponse) {
    for dropped in &response.dropped_tickers {
        print_warning(&format!(
            "{} dropped (coverage {:.0}%)",
            dropped.ticker,
            dropped.coverage * 100.0
        ));
    }
}

/// Prints a warning message.
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message);
}

/// A key-value pair for display.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct KeyValue {
    #[tabled(rename = "Metric")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

impl KeyValue {
    /// Creates a new key-value pair.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Creates a key-value pair formatted as percentage.
    pub fn from_percent(key: impl Into<String>, value: f64) -> Self {
        Self::new(key, format_percent(value))
    }

    /// Creates a key-value pair formatted as dollars.
    pub fn from_usd(key: impl Into<String>, value: f64) -> Self {
        Self::new(key, format_usd(value))
    }
}

/// Prints a header for a section.
pub fn print_header(title: &str) {
    println!("\n{}", title.bold().underline());
}
