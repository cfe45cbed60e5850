//! # Ares Server
//!
//! REST server for the Ares portfolio allocation engine.
//!
//! ## Endpoints
//!
//! - `GET /health`: liveness probe
//! - `POST /api/portfolio/optimize`: full optimization response
//! - `GET /api/frontier`: efficient frontier only
//! - `GET /api/backtest`: backtest only
//! - `GET /api/risk-details`: correlation, risk contribution, stress test and VaR
//! - `GET /api/tickers/suggest`: curated tickers by sector
//!
//! Client errors map to 422 with `{error, kind}`, deadline overruns to 504
//! and everything else to 500.
//!
//! ## Usage
//!
//! ```ignore
//! use ares_server::Server;
//!
//! let server = Server::new(config, engine);
//! server.start().await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod handlers;
pub mod routes;

use std::net::{IpAddr, SocketAddr};

use ares_engine::AllocationEngine;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub use config::{ConfigError, ServerConfig};

/// The Ares server.
pub struct Server {
    config: ServerConfig,
    engine: AllocationEngine,
}

impl Server {
    /// Create a new server.
    pub fn new(config: ServerConfig, engine: AllocationEngine) -> Self {
        Self { config, engine }
    }

    /// Build the router.
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        routes::create_router(self.engine.clone())
            .layer(TraceLayer::new_for_http())
            .layer(cors)
    }

    /// Bind address from the configuration.
    pub fn addr(&self) -> SocketAddr {
        let ip = self.config.host.parse().unwrap_or_else(|_| {
            warn!(host = %self.config.host, "unparseable host, binding 0.0.0.0");
            IpAddr::from([0, 0, 0, 0])
        });
        SocketAddr::new(ip, self.config.port)
    }

    /// Start the server.
    pub async fn start(&self) -> Result<(), std::io::Error> {
        let addr = self.addr();

        info!("Starting Ares server on {}", addr);

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, self.router()).await
    }
}
