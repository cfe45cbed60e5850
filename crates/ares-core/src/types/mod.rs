//! Domain types for portfolio construction.

mod date;
mod price_matrix;
mod series;
mod ticker;

pub use date::Date;
pub use price_matrix::{AlignedPrices, DroppedSeries, PriceMatrix};
pub use series::{AssetSeries, PricePoint};
pub use ticker::{Ticker, TickerIndex};
