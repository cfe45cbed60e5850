//! Integration tests for the Ares Server API endpoints.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use ares_core::types::PricePoint;
use ares_core::{AssetSeries, Date, EngineConfig, Ticker};
use ares_engine::{AllocationEngine, EngineSettings};
use ares_ext_file::{CsvPriceSource, InMemoryPriceSource};
use ares_server::routes::{create_router, PROCESS_TIME_HEADER};

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

fn trading_days() -> Vec<Date> {
    let mut days = Vec::new();
    let mut d = Date::from_ymd(2021, 1, 4).unwrap();
    while d <= as_of() {
        let weekday = d.as_naive_date().format("%u").to_string();
        if weekday != "6" && weekday != "7" {
            days.push(d);
        }
        d = d.add_days(1);
    }
    days
}

fn closes(seed: u64, drift: f64, vol: f64) -> Vec<(Date, f64)> {
    let mut price = 50.0;
    trading_days()
        .into_iter()
        .enumerate()
        .map(|(i, date)| {
            let row = (date, price);
            price *= 1.0 + drift + 0.012 * centered(77, i as u64) + vol * centered(seed, i as u64);
            row
        })
        .collect()
}

const UNIVERSE: [(&str, u64, f64, f64); 4] = [
    ("AAPL", 11, 0.0008, 0.028),
    ("JNJ", 12, 0.0003, 0.011),
    ("XOM", 13, 0.0005, 0.025),
    ("SPY", 14, 0.0004, 0.009),
];

fn memory_source() -> InMemoryPriceSource {
    InMemoryPriceSource::with_series(UNIVERSE.iter().map(|&(symbol, seed, drift, vol)| {
        let points = closes(seed, drift, vol)
            .into_iter()
            .map(|(date, close)| PricePoint::new(date, close))
            .collect();
        AssetSeries::new(Ticker::parse(symbol).unwrap(), points).unwrap()
    }))
}

fn settings() -> EngineSettings {
    EngineSettings::default()
        .with_as_of(as_of())
        .with_max_concurrent(2)
        .with_engine_config(EngineConfig::default().with_frontier_points(10))
}

fn app_with(settings: EngineSettings) -> Router {
    let engine = AllocationEngine::new(Arc::new(memory_source()), settings).unwrap();
    create_router(engine)
}

fn app() -> Router {
    app_with(settings())
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value, bool) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let timed = response.headers().contains_key(PROCESS_TIME_HEADER);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json, timed)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value, bool) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value, bool) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

// =============================================================================
// HEALTH
// =============================================================================

#[tokio::test]
async fn test_health() {
    let (status, body, timed) = get(app(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(timed);
}

// =============================================================================
// OPTIMIZE
// =============================================================================

#[tokio::test]
async fn test_optimize_success() {
    let body = json!({
        "tickers": ["aapl", " jnj ", "XOM"],
        "investment": 50000,
        "risk_tolerance": 0.7,
        "time_horizon_years": 2,
        "monthly_contribution": 500
    });
    let (status, body, timed) = post_json(app(), "/api/portfolio/optimize", body).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(timed);
    assert_eq!(body["success"], true);

    let data = &body["data"];
    assert_eq!(data["valid_tickers"], json!(["AAPL", "JNJ", "XOM"]));
    let weights = data["optimization"]["weights"].as_object().unwrap();
    let total: f64 = weights.values().map(|w| w.as_f64().unwrap()).sum();
    assert!((total - 1.0).abs() < 1e-6);
    assert!(weights.values().all(|w| w.as_f64().unwrap() >= -1e-9));

    assert!(!data["efficient_frontier"].as_array().unwrap().is_empty());
    assert!(data["var"]["daily_var"].as_f64().unwrap() > 0.0);
    assert_eq!(data["backtest"]["monthly_contribution"], 500.0);
    assert_eq!(data["correlation_matrix"].as_object().unwrap().len(), 3);
    assert_eq!(data["contribution_to_risk"].as_array().unwrap().len(), 3);
    assert_eq!(data["stress_test"]["crash_scenario_pct"], -0.2);
}

#[tokio::test]
async fn test_optimize_single_ticker_is_validation_error() {
    let (status, body, timed) =
        post_json(app(), "/api/portfolio/optimize", json!({"tickers": ["AAPL"]})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "validation");
    assert!(body["error"].as_str().unwrap().contains("tickers"));
    assert!(timed);
}

#[tokio::test]
async fn test_optimize_out_of_range_investment() {
    let body = json!({"tickers": ["AAPL", "JNJ"], "investment": 10});
    let (status, body, _) = post_json(app(), "/api/portfolio/optimize", body).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "validation");
}

#[tokio::test]
async fn test_optimize_unknown_ticker_below_minimum() {
    let body = json!({"tickers": ["AAPL", "NOPE"]});
    let (status, body, _) = post_json(app(), "/api/portfolio/optimize", body).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "below_minimum_assets");
}

#[tokio::test]
async fn test_optimize_missing_field_rejected() {
    let (status, _, _) = post_json(app(), "/api/portfolio/optimize", json!({"investment": 5000})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_optimize_missing_benchmark_is_server_error() {
    let app = app_with(settings().with_benchmark("QQQ"));
    let body = json!({"tickers": ["AAPL", "JNJ", "XOM"]});
    let (status, body, _) = post_json(app, "/api/portfolio/optimize", body).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["kind"], "source");
}

#[tokio::test]
async fn test_optimize_deadline_maps_to_gateway_timeout() {
    let config = EngineConfig::default().with_request_timeout(Duration::ZERO);
    let app = app_with(settings().with_engine_config(config));
    let body = json!({"tickers": ["AAPL", "JNJ", "XOM"]});
    let (status, body, _) = post_json(app, "/api/portfolio/optimize", body).await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body["kind"], "deadline_exceeded");
}

// =============================================================================
// FRONTIER / BACKTEST / RISK
// =============================================================================

#[tokio::test]
async fn test_frontier() {
    let (status, body, _) = get(app(), "/api/frontier?tickers=AAPL,JNJ,XOM&time_horizon_years=2").await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let frontier = body["frontier"].as_array().unwrap();
    assert!(!frontier.is_empty());
    assert!(frontier.len() <= 50);
    let vols: Vec<f64> = frontier
        .iter()
        .map(|p| p["volatility"].as_f64().unwrap())
        .collect();
    assert!(vols.windows(2).all(|w| w[1] >= w[0] - 1e-9));
    assert!(frontier[0].get("return").is_some());
}

#[tokio::test]
async fn test_frontier_requires_two_tickers() {
    let (status, body, _) = get(app(), "/api/frontier?tickers=AAPL").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "validation");
}

#[tokio::test]
async fn test_frontier_missing_query() {
    let (status, _, _) = get(app(), "/api/frontier").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_backtest() {
    let uri = "/api/backtest?tickers=aapl,jnj,xom&investment=20000&monthly_contribution=250&time_horizon_years=2";
    let (status, body, _) = get(app(), uri).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["investment"], 20000.0);
    let backtest = &body["backtest"];
    let dates = backtest["dates"].as_array().unwrap();
    assert_eq!(dates.len(), backtest["portfolio_values"].as_array().unwrap().len());
    assert_eq!(dates.len(), backtest["benchmark_values"].as_array().unwrap().len());
    assert_eq!(backtest["monthly_contribution"], 250.0);
    assert!(backtest["total_invested"].as_f64().unwrap() > 20000.0);
}

#[tokio::test]
async fn test_backtest_buy_and_hold_omits_contribution() {
    let (status, body, _) = get(app(), "/api/backtest?tickers=AAPL,JNJ&time_horizon_years=1").await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(body["backtest"].get("monthly_contribution").is_none());
}

#[tokio::test]
async fn test_risk_details() {
    let (status, body, _) = get(app(), "/api/risk-details?tickers=AAPL,JNJ,XOM&investment=10000").await;
    assert_eq!(status, StatusCode::OK, "{body}");
    for key in ["correlation_matrix", "contribution_to_risk", "stress_test", "var"] {
        assert!(body.get(key).is_some(), "missing {key}");
    }
    let total: f64 = body["contribution_to_risk"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["contribution"].as_f64().unwrap())
        .sum();
    assert!((total - 100.0).abs() < 0.1);
    assert_eq!(body["stress_test"]["value_before"], 10000.0);
}

// =============================================================================
// UNIVERSE
// =============================================================================

#[tokio::test]
async fn test_suggest_all_sectors() {
    let (status, body, _) = get(app(), "/api/tickers/suggest").await;
    assert_eq!(status, StatusCode::OK);
    let universe = body["universe"].as_object().unwrap();
    assert_eq!(universe.len(), 7);
    assert!(universe["ETFs"].as_array().unwrap().contains(&json!("SPY")));
}

#[tokio::test]
async fn test_suggest_one_sector_case_insensitive() {
    let (status, body, _) = get(app(), "/api/tickers/suggest?sector=technology").await;
    assert_eq!(status, StatusCode::OK);
    let universe = body["universe"].as_object().unwrap();
    assert_eq!(universe.len(), 1);
    assert!(universe["Technology"].as_array().unwrap().contains(&json!("AAPL")));
}

#[tokio::test]
async fn test_suggest_unknown_sector_is_empty() {
    let (status, body, _) = get(app(), "/api/tickers/suggest?sector=crypto").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["universe"].as_object().unwrap().is_empty());
}

// =============================================================================
// CSV SOURCE END TO END
// =============================================================================

#[tokio::test]
async fn test_optimize_over_csv_directory() {
    let dir = tempfile::tempdir().unwrap();
    for &(symbol, seed, drift, vol) in &UNIVERSE {
        let mut csv = String::from("date,close\n");
        for (date, close) in closes(seed, drift, vol) {
            csv.push_str(&format!("{date},{close:.4}\n"));
        }
        std::fs::write(dir.path().join(format!("{symbol}.csv")), csv).unwrap();
    }

    let source = CsvPriceSource::new(dir.path()).unwrap();
    let engine = AllocationEngine::new(Arc::new(source), settings()).unwrap();
    let body = json!({"tickers": ["AAPL", "JNJ", "XOM"], "time_horizon_years": 1});
    let (status, body, _) = post_json(create_router(engine), "/api/portfolio/optimize", body).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["valid_tickers"].as_array().unwrap().len(), 3);
}
