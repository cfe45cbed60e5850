//! # Ares Core
//!
//! Core types and configuration for the Ares portfolio allocation engine.
//!
//! This crate provides the foundational building blocks used throughout Ares:
//!
//! - **Types**: `Date`, `Ticker`, the bidirectional `TickerIndex`,
//!   `AssetSeries` and the aligned `PriceMatrix`
//! - **Configuration**: the immutable `EngineConfig` threaded through every
//!   pipeline stage
//!
//! ## Design Philosophy
//!
//! - **Type Safety**: Newtypes prevent mixing tickers, dates and raw strings
//! - **Integer Indexing**: Matrices are indexed by position; tickers only
//!   appear at input/output boundaries
//! - **Explicit Over Implicit**: No ambient or global parameters
//!
//! ## Example
//!
//! ```rust
//! use ares_core::prelude::*;
//!
//! let index = TickerIndex::new(vec![Ticker::parse("aapl")?, Ticker::parse("MSFT")?])?;
//! assert_eq!(index.position(&Ticker::parse("MSFT")?), Some(1));
//! # Ok::<(), ares_core::CoreError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::uninlined_format_args)]

pub mod config;
pub mod error;
pub mod types;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::{
        AlignmentPolicy, EngineConfig, ReturnEstimator, ShrinkageTarget, SolverBudget,
        StrategyBasis,
    };
    pub use crate::error::{CoreError, CoreResult};
    pub use crate::types::{
        AlignedPrices, AssetSeries, Date, DroppedSeries, PriceMatrix, PricePoint, Ticker,
        TickerIndex,
    };
}

// Re-export commonly used types at crate root
pub use config::EngineConfig;
pub use error::{CoreError, CoreResult};
pub use types::{AssetSeries, Date, PriceMatrix, Ticker, TickerIndex};
