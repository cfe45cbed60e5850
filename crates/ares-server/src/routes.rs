//! Route definitions.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;

use ares_engine::AllocationEngine;

use crate::handlers::{self, AppState};

/// Header carrying the server-side processing time, e.g. `0.0123s`.
pub const PROCESS_TIME_HEADER: &str = "x-process-time";

/// Create the API router.
///
/// # Arguments
/// * `engine` - The allocation engine
pub fn create_router(engine: AllocationEngine) -> Router {
    let state = Arc::new(AppState { engine });

    Router::new()
        // Health
        .route("/health", get(handlers::health))
        // Portfolio
        .route("/api/portfolio/optimize", post(handlers::optimize))
        .route("/api/frontier", get(handlers::frontier))
        .route("/api/backtest", get(handlers::backtest))
        .route("/api/risk-details", get(handlers::risk_details))
        // Universe
        .route("/api/tickers/suggest", get(handlers::suggest_tickers))
        .layer(middleware::from_fn(process_time))
        // State
        .with_state(state)
}

/// Stamps every response with the time spent producing it.
async fn process_time(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let mut response = next.run(request).await;
    let elapsed = format!("{:.4}s", start.elapsed().as_secs_f64());
    if let Ok(value) = HeaderValue::from_str(&elapsed) {
        response.headers_mut().insert(PROCESS_TIME_HEADER, value);
    }
    response
}
