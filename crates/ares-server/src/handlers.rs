//! Request handlers.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use ares_engine::universe::universe;
use ares_engine::{parse_ticker_list, AllocationEngine, EngineError, OptimizeRequest, Sector};

/// Application state.
pub struct AppState {
    /// The allocation engine
    pub engine: AllocationEngine,
}

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    version: String,
}

/// Health check handler.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Error response.
#[derive(Serialize)]
pub struct ErrorResponse {
    error: String,
    kind: &'static str,
}

/// An engine error on its way to the client.
pub struct ApiError(EngineError);

impl From<EngineError> for ApiError {
    fn from(error: EngineError) -> Self {
        Self(error)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        if self.0.is_deadline() {
            StatusCode::GATEWAY_TIMEOUT
        } else if self.0.is_client_error() {
            StatusCode::UNPROCESSABLE_ENTITY
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(kind = self.0.kind(), error = %self.0, "request failed");
        } else {
            info!(kind = self.0.kind(), error = %self.0, "request rejected");
        }
        let body = ErrorResponse {
            error: self.0.to_string(),
            kind: self.0.kind(),
        };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

// =============================================================================
// OPTIMIZE
// =============================================================================

/// Successful optimization envelope.
#[derive(Serialize)]
pub struct OptimizeEnvelope<T> {
    success: bool,
    data: T,
}

/// Runs the full pipeline for a request body.
pub async fn optimize(
    State(state): State<Arc<AppState>>,
    Json(request): Json<OptimizeRequest>,
) -> ApiResult<OptimizeEnvelope<ares_engine::OptimizeResponse>> {
    info!(
        tickers = ?request.tickers,
        investment = request.investment,
        risk_tolerance = request.risk_tolerance,
        time_horizon_years = request.time_horizon_years,
        "optimization request"
    );
    let data = state.engine.optimize(request).await?;
    Ok(Json(OptimizeEnvelope {
        success: true,
        data,
    }))
}

// =============================================================================
// FRONTIER
// =============================================================================

/// Query parameters for the frontier.
#[derive(Debug, Deserialize)]
pub struct FrontierQuery {
    /// Comma-separated ticker list.
    pub tickers: String,
    /// Horizon in years; drives the history window.
    #[serde(default = "default_horizon")]
    pub time_horizon_years: u32,
}

/// Frontier response.
#[derive(Serialize)]
pub struct FrontierResponse {
    frontier: Vec<ares_engine::FrontierPoint>,
}

/// Efficient frontier points for plotting.
pub async fn frontier(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FrontierQuery>,
) -> ApiResult<FrontierResponse> {
    let tickers = parse_ticker_list(&query.tickers)?;
    let frontier = state
        .engine
        .frontier(tickers, query.time_horizon_years)
        .await?;
    Ok(Json(FrontierResponse { frontier }))
}

// =============================================================================
// BACKTEST / RISK DETAILS
// =============================================================================

/// Query parameters for the backtest view.
#[derive(Debug, Deserialize)]
pub struct BacktestQuery {
    /// Comma-separated ticker list.
    pub tickers: String,
    /// Initial investment.
    #[serde(default = "default_investment")]
    pub investment: f64,
    /// Monthly contribution; zero means buy and hold.
    #[serde(default)]
    pub monthly_contribution: f64,
    /// Backtest horizon in years.
    #[serde(default = "default_horizon")]
    pub time_horizon_years: u32,
}

/// Historical backtest of the balanced-tolerance portfolio.
pub async fn backtest(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BacktestQuery>,
) -> ApiResult<ares_engine::BacktestReport> {
    let tickers = parse_ticker_list(&query.tickers)?;
    let mut request = OptimizeRequest::new(tickers.iter().map(ToString::to_string))
        .with_investment(query.investment)
        .with_horizon(query.time_horizon_years);
    if query.monthly_contribution > 0.0 {
        request = request.with_monthly_contribution(query.monthly_contribution);
    }
    Ok(Json(state.engine.backtest(request).await?))
}

/// Query parameters for the risk view.
#[derive(Debug, Deserialize)]
pub struct RiskQuery {
    /// Comma-separated ticker list.
    pub tickers: String,
    /// Portfolio value.
    #[serde(default = "default_investment")]
    pub investment: f64,
    /// Horizon in years.
    #[serde(default = "default_horizon")]
    pub time_horizon_years: u32,
}

/// Correlation, risk contribution, stress test and VaR.
pub async fn risk_details(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RiskQuery>,
) -> ApiResult<ares_engine::RiskDetails> {
    let tickers = parse_ticker_list(&query.tickers)?;
    let request = OptimizeRequest::new(tickers.iter().map(ToString::to_string))
        .with_investment(query.investment)
        .with_horizon(query.time_horizon_years);
    Ok(Json(state.engine.risk_details(request).await?))
}

// =============================================================================
// UNIVERSE
// =============================================================================

/// Query parameters for ticker suggestions.
#[derive(Debug, Deserialize)]
pub struct SuggestQuery {
    /// Optional sector name, any case.
    pub sector: Option<String>,
}

/// Suggestion response.
#[derive(Serialize)]
pub struct SuggestResponse {
    universe: BTreeMap<&'static str, Vec<&'static str>>,
}

/// Curated tickers grouped by sector.
///
/// An unknown sector yields an empty universe.
pub async fn suggest_tickers(Query(query): Query<SuggestQuery>) -> Json<SuggestResponse> {
    let groups = match query.sector.as_deref().map(str::parse::<Sector>) {
        None => universe(None),
        Some(Ok(sector)) => universe(Some(sector)),
        Some(Err(_)) => BTreeMap::new(),
    };
    Json(SuggestResponse { universe: groups })
}

fn default_investment() -> f64 {
    100_000.0
}

fn default_horizon() -> u32 {
    5
}
