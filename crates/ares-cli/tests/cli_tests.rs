//! End-to-end tests of the `ares` binary.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;

fn simple_hash(seed: u64, i: u64) -> u64 {
    let mut x = seed.wrapping_add(i).wrapping_mul(0x517cc1b727220a95);
    x ^= x >> 32;
    x = x.wrapping_mul(0x517cc1b727220a95);
    x ^= x >> 32;
    x
}

fn centered(seed: u64, i: u64) -> f64 {
    (simple_hash(seed, i) % 1_000_000) as f64 / 1_000_000.0 - 0.5
}

/// Writes weekday closes from 2022-01-03 through 2025-06-30.
fn write_prices(dir: &Path) {
    let universe = [
        ("AAPL", 21, 0.0008, 0.027),
        ("JNJ", 22, 0.0003, 0.011),
        ("XOM", 23, 0.0005, 0.024),
        ("SPY", 24, 0.0004, 0.009),
    ];
    let start = ares_core::Date::from_ymd(2022, 1, 3).unwrap();
    let end = ares_core::Date::from_ymd(2025, 6, 30).unwrap();
    for (symbol, seed, drift, vol) in universe {
        let mut csv = String::from("date,close\n");
        let mut price = 80.0;
        let mut d = start;
        let mut i = 0u64;
        while d <= end {
            let weekday = d.as_naive_date().format("%u").to_string();
            if weekday != "6" && weekday != "7" {
                csv.push_str(&format!("{d},{price:.4}\n"));
                price *= 1.0 + drift + 0.01 * centered(55, i) + vol * centered(seed, i);
                i += 1;
            }
            d = d.add_days(1);
        }
        std::fs::write(dir.join(format!("{symbol}.csv")), csv).unwrap();
    }
}

fn ares() -> Command {
    Command::cargo_bin("ares").unwrap()
}

#[test]
fn test_optimize_json() {
    let dir = tempfile::tempdir().unwrap();
    write_prices(dir.path());

    let output = ares()
        .args(["--format", "json", "optimize", "--tickers", "aapl,JNJ,xom"])
        .args(["--as-of", "2025-06-30", "--horizon", "1"])
        .arg("--prices")
        .arg(dir.path())
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let response: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(response["valid_tickers"].as_array().unwrap().len(), 3);
    let total: f64 = response["optimization"]["weights"]
        .as_object()
        .unwrap()
        .values()
        .map(|w| w.as_f64().unwrap())
        .sum();
    assert!((total - 1.0).abs() < 1e-6);
}

#[test]
fn test_optimize_table() {
    let dir = tempfile::tempdir().unwrap();
    write_prices(dir.path());

    ares()
        .args(["optimize", "--tickers", "AAPL,JNJ,XOM", "--as-of", "2025-06-30"])
        .arg("--prices")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Allocation"))
        .stdout(predicate::str::contains("Sharpe Ratio"))
        .stdout(predicate::str::contains("Max Drawdown"));
}

#[test]
fn test_optimize_warns_about_unknown_ticker() {
    let dir = tempfile::tempdir().unwrap();
    write_prices(dir.path());

    ares()
        .args(["optimize", "--tickers", "AAPL,JNJ,XOM,NOPE", "--as-of", "2025-06-30"])
        .arg("--prices")
        .arg(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("NOPE dropped"));
}

#[test]
fn test_frontier_csv() {
    let dir = tempfile::tempdir().unwrap();
    write_prices(dir.path());

    ares()
        .args(["--format", "csv", "frontier", "--tickers", "AAPL,JNJ,XOM", "--as-of", "2025-06-30"])
        .arg("--prices")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::starts_with("return,volatility"));
}

#[test]
fn test_risk_json() {
    let dir = tempfile::tempdir().unwrap();
    write_prices(dir.path());

    let output = ares()
        .args(["-f", "json", "risk", "--tickers", "AAPL,JNJ,XOM", "--as-of", "2025-06-30"])
        .args(["--investment", "50000"])
        .arg("--prices")
        .arg(dir.path())
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["correlation_matrix"].as_object().unwrap().len(), 3);
    assert_eq!(report["stress_scenarios"].as_array().unwrap().len(), 4);
    assert_eq!(report["stress_test"]["value_before"], 50000.0);
}

#[test]
fn test_single_ticker_fails() {
    let dir = tempfile::tempdir().unwrap();
    write_prices(dir.path());

    ares()
        .args(["optimize", "--tickers", "AAPL"])
        .arg("--prices")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("validation"));
}

#[test]
fn test_missing_price_directory_fails() {
    ares()
        .args(["optimize", "--tickers", "AAPL,JNJ", "--prices", "/nonexistent/ares"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Price data unavailable"));
}

#[test]
fn test_universe_one_sector() {
    let output = ares()
        .args(["--format", "json", "universe", "--sector", "energy"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let groups: Value = serde_json::from_slice(&output.stdout).unwrap();
    let groups = groups.as_object().unwrap();
    assert_eq!(groups.len(), 1);
    assert!(groups["Energy"].as_array().unwrap().iter().any(|t| t == "XOM"));
}

#[test]
fn test_universe_unknown_sector_fails() {
    ares()
        .args(["universe", "--sector", "crypto"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("sector"));
}
