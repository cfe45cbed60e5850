//! # Ares Traits
//!
//! Trait definitions for the Ares allocation engine.
//!
//! This crate contains ONLY trait definitions with no runtime dependencies.
//! Implementations live in extension crates (`ares-ext-file`).
//!
//! ## Module Structure
//!
//! - [`price_history`]: Adjusted-close history providers
//! - [`error`]: The shared [`SourceError`]
//!
//! ## Dependency Injection
//!
//! The engine receives its price source at construction:
//!
//! ```ignore
//! let source = Arc::new(CsvPriceSource::new("data/prices")?);
//! let engine = AllocationEngine::new(source, EngineSettings::default());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod price_history;

// Re-export commonly used types
pub use error::{SourceError, SourceResult};
pub use price_history::{PriceHistorySource, SourceType};
