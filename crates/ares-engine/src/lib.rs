//! # Ares Engine
//!
//! Request orchestration for the Ares portfolio allocation engine.
//!
//! This crate provides:
//! - [`OptimizeRequest`]: the request contract and its validation
//! - [`OptimizeResponse`]: the response contract
//! - [`AllocationEngine`]: price retrieval, alignment and the analytics
//!   pipeline under a request deadline
//! - [`OptimizationPool`]: the bounded pool CPU-bound solves run on
//! - [`universe`]: the curated sector universe
//!
//! ## Architecture
//!
//! ```text
//! OptimizeRequest ─> validate ─> PriceHistorySource ─> align ─┐
//!                                                             │
//!       OptimizationPool (spawn_blocking, deadline) <─────────┘
//!              │
//!              └─> returns ─> Σ, μ ─> weights ─┬─> frontier
//!                                              ├─> VaR, correlation, contribution, stress
//!                                              └─> backtest vs benchmark
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let source = Arc::new(CsvPriceSource::new("data/prices")?);
//! let engine = AllocationEngine::new(source, EngineSettings::default())?;
//! let response = engine.optimize(OptimizeRequest::new(["AAPL", "MSFT", "JNJ"])).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod engine;
pub mod error;
pub mod pipeline;
pub mod pool;
pub mod request;
pub mod response;
pub mod settings;
pub mod universe;

// Re-exports
pub use ares_analytics::optimization::FrontierPoint;
pub use engine::{AllocationEngine, MarketData};
pub use error::{EngineError, EngineResult};
pub use pool::OptimizationPool;
pub use request::{normalize_tickers, parse_ticker_list, OptimizeRequest, ValidatedRequest};
pub use response::{BacktestReport, OptimizationSummary, OptimizeResponse, RiskDetails};
pub use settings::EngineSettings;
pub use universe::Sector;
