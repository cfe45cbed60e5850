//! # Ares Ext File
//!
//! File-based and in-memory price history sources for the Ares allocation
//! engine.
//!
//! - [`CsvPriceSource`]: one `<TICKER>.csv` per ticker with `date,close`
//!   columns, parsed once and cached
//! - [`InMemoryPriceSource`]: series inserted directly, for tests and demos
//!
//! For live data, implement [`PriceHistorySource`](ares_traits::PriceHistorySource)
//! over a vendor API in a separate extension.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod csv_source;
mod memory;

pub use csv_source::CsvPriceSource;
pub use memory::InMemoryPriceSource;
