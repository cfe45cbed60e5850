//! Ares allocation server entry point.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ares_engine::AllocationEngine;
use ares_ext_file::CsvPriceSource;
use ares_server::{Server, ServerConfig};
use ares_traits::PriceHistorySource;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,ares=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Ares Allocation Server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config/ares.toml".to_string());

    let server_config = if std::path::Path::new(&config_path).exists() {
        info!("Loading configuration from {}", config_path);
        ServerConfig::from_file(&config_path)
            .with_context(|| format!("loading {config_path}"))?
    } else {
        info!("Using default configuration");
        ServerConfig::default()
    };

    // Price source
    let source = CsvPriceSource::new(&server_config.price_data_dir)
        .with_context(|| format!("opening price directory {}", server_config.price_data_dir))?;
    let available = source.available().await?;
    info!(
        directory = %server_config.price_data_dir,
        tickers = available.len(),
        "price source ready"
    );

    // Build engine
    let engine = AllocationEngine::new(Arc::new(source), server_config.settings.clone())?;

    // Start server
    let server = Server::new(server_config, engine);
    server.start().await?;

    Ok(())
}
