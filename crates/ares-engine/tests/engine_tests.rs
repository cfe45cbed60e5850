//! End-to-end tests of the allocation engine over an in-memory source.

use std::sync::Arc;
use std::time::Duration;

use approx::assert_relative_eq;

use ares_core::types::PricePoint;
use ares_core::{AssetSeries, Date, EngineConfig, Ticker};
use ares_engine::{AllocationEngine, EngineError, EngineSettings, OptimizeRequest};
use ares_ext_file::InMemoryPriceSource;

// =============================================================================
// FIXTURES
// =============================================================================

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

fn as_of() -> Date {
    Date::from_ymd(2025, 6, 30).unwrap()
}

/// Weekdays from `start` through the as-of date.
fn trading_days(start: Date) -> Vec<Date> {
    let mut days = Vec::new();
    let mut d = start;
    while d <= as_of() {
        let weekday = d.as_naive_date().format("%u").to_string();
        if weekday != "6" && weekday != "7" {
            days.push(d);
        }
        d = d.add_days(1);
    }
    days
}

fn series(symbol: &str, seed: u64, drift: f64, vol: f64, start: Date) -> AssetSeries {
    let mut price = 100.0;
    let points = trading_days(start)
        .into_iter()
        .enumerate()
        .map(|(i, date)| {
            let point = PricePoint::new(date, price);
            let market = 0.015 * centered(99, i as u64);
            price *= 1.0 + drift + market + vol * centered(seed, i as u64);
            point
        })
        .collect();
    AssetSeries::new(Ticker::parse(symbol).unwrap(), points).unwrap()
}

fn source() -> InMemoryPriceSource {
    let start = Date::from_ymd(2021, 1, 4).unwrap();
    InMemoryPriceSource::with_series([
        series("AAPL", 1, 0.0008, 0.03, start),
        series("MSFT", 2, 0.0007, 0.025, start),
        series("JNJ", 3, 0.0003, 0.012, start),
        series("XOM", 4, 0.0005, 0.028, start),
        series("SPY", 5, 0.0004, 0.01, start),
        // Listed in 2025: too little coverage of a three-year window.
        series("NEWCO", 6, 0.001, 0.04, Date::from_ymd(2025, 3, 3).unwrap()),
    ])
}

fn engine_with(settings: EngineSettings) -> AllocationEngine {
    AllocationEngine::new(Arc::new(source()), settings.with_as_of(as_of())).unwrap()
}

fn engine() -> AllocationEngine {
    let config = EngineConfig::default().with_frontier_points(12);
    engine_with(EngineSettings::default().with_engine_config(config).with_max_concurrent(2))
}

// =============================================================================
// OPTIMIZE
// =============================================================================

#[tokio::test]
async fn test_optimize_full_response() {
    let request = OptimizeRequest::new(["aapl", "MSFT", "jnj"])
        .with_investment(50_000.0)
        .with_horizon(2)
        .with_monthly_contribution(500.0);
    let response = engine().optimize(request).await.unwrap();

    let names: Vec<&str> = response.valid_tickers.iter().map(Ticker::as_str).collect();
    assert_eq!(names, vec!["AAPL", "MSFT", "JNJ"]);

    let total: f64 = response.optimization.weights.values().sum();
    assert_relative_eq!(total, 1.0, epsilon = 1e-6);
    assert!(response.optimization.weights.values().all(|&w| w >= 0.0));

    assert!(!response.efficient_frontier.is_empty());
    assert!((response.var.annual_var / response.var.daily_var - 252f64.sqrt()).abs() < 0.2);

    let contributions: f64 = response.contribution_to_risk.iter().map(|c| c.contribution).sum();
    assert_relative_eq!(contributions, 100.0, epsilon = 0.1);

    assert_eq!(response.correlation_matrix.len(), 3);
    assert_relative_eq!(response.stress_test.loss_usd, 10_000.0, epsilon = 1e-6);
    assert_eq!(response.stress_scenarios.len(), 4);

    let backtest = &response.backtest;
    assert!(backtest.dates.len() <= 2 * 252);
    assert_relative_eq!(backtest.portfolio_values[0], 50_000.0, epsilon = 1e-6);
    assert!(backtest.total_invested > 50_000.0);
    assert_eq!(backtest.monthly_contribution, Some(500.0));
}

#[tokio::test]
async fn test_pinned_as_of_bounds_history_and_backtest() {
    let pinned = Date::from_ymd(2024, 6, 28).unwrap();
    let engine =
        AllocationEngine::new(Arc::new(source()), EngineSettings::default().with_as_of(pinned)).unwrap();

    let tickers: Vec<Ticker> = ["AAPL", "MSFT", "JNJ"]
        .iter()
        .map(|s| Ticker::parse(s).unwrap())
        .collect();
    let market = engine.load_market(&tickers, 1).await.unwrap();
    let dates = market.prices.dates();
    assert_eq!(dates.last(), Some(&pinned));
    assert!(dates[0] >= Date::from_ymd(2021, 6, 28).unwrap());

    let request = OptimizeRequest::new(["AAPL", "MSFT", "JNJ"]).with_horizon(1);
    let response = engine.optimize(request).await.unwrap();
    let backtest = &response.backtest;
    assert_eq!(backtest.dates.last(), Some(&pinned));
    assert!(backtest.dates.iter().all(|d| *d <= pinned));
    assert!(backtest.dates[0] >= Date::from_ymd(2023, 6, 28).unwrap());
}

#[tokio::test]
async fn test_response_serializes_contract_fields() {
    let response = engine()
        .optimize(OptimizeRequest::new(["AAPL", "JNJ"]))
        .await
        .unwrap();
    let json = serde_json::to_value(&response).unwrap();
    for key in [
        "valid_tickers",
        "optimization",
        "efficient_frontier",
        "var",
        "backtest",
        "correlation_matrix",
        "contribution_to_risk",
        "stress_test",
    ] {
        assert!(json.get(key).is_some(), "missing {key}");
    }
    assert!(json["efficient_frontier"][0].get("return").is_some());
    assert!(json["optimization"]["weights"].get("AAPL").is_some());
    assert!(json["optimization"]["strategy"].is_string());
}

#[tokio::test]
async fn test_unknown_and_short_tickers_dropped() {
    let response = engine()
        .optimize(OptimizeRequest::new(["AAPL", "MSFT", "ZZZZ", "NEWCO"]))
        .await
        .unwrap();
    assert_eq!(response.valid_tickers.len(), 2);
    let dropped: Vec<&str> = response
        .dropped_tickers
        .iter()
        .map(|d| d.ticker.as_str())
        .collect();
    assert!(dropped.contains(&"ZZZZ"));
    assert!(dropped.contains(&"NEWCO"));
}

#[tokio::test]
async fn test_one_valid_ticker_is_below_minimum() {
    let err = engine()
        .optimize(OptimizeRequest::new(["AAPL", "ZZZZ"]))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "below_minimum_assets");
}

#[tokio::test]
async fn test_validation_error_kind() {
    let err = engine()
        .optimize(OptimizeRequest::new(["AAPL", "MSFT"]).with_investment(10.0))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation { .. }));
}

#[tokio::test]
async fn test_missing_benchmark_is_source_error() {
    let settings = EngineSettings::default().with_benchmark("QQQ");
    let err = engine_with(settings)
        .optimize(OptimizeRequest::new(["AAPL", "MSFT"]))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "source");
}

#[tokio::test]
async fn test_zero_deadline_times_out() {
    let config = EngineConfig::default().with_request_timeout(Duration::ZERO);
    let err = engine_with(EngineSettings::default().with_engine_config(config))
        .optimize(OptimizeRequest::new(["AAPL", "MSFT", "JNJ", "XOM"]))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::DeadlineExceeded { .. }));
}

// =============================================================================
// OTHER OPERATIONS
// =============================================================================

#[tokio::test]
async fn test_frontier_endpoint_points() {
    let tickers = ares_engine::parse_ticker_list("AAPL,MSFT,JNJ,XOM").unwrap();
    let frontier = engine().frontier(tickers, 5).await.unwrap();
    assert!(frontier.len() > 1 && frontier.len() <= 50);
    assert!(frontier
        .windows(2)
        .all(|w| w[1].volatility >= w[0].volatility - 1e-8));
}

#[tokio::test]
async fn test_backtest_and_risk_views() {
    let engine = engine();
    let request = OptimizeRequest::new(["AAPL", "XOM"]).with_investment(20_000.0);
    let report = engine.backtest(request.clone()).await.unwrap();
    assert_eq!(report.investment, 20_000.0);
    assert_eq!(report.backtest.portfolio_values.len(), report.backtest.dates.len());

    let risk = engine.risk_details(request).await.unwrap();
    assert_eq!(risk.contribution_to_risk.len(), 2);
    assert!((risk.var.confidence - 0.95).abs() < 1e-12);
}
