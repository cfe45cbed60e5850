//! In-memory price history source.

use async_trait::async_trait;
use dashmap::DashMap;

use ares_core::{AssetSeries, Date, Ticker};
use ares_traits::error::SourceResult;
use ares_traits::price_history::{PriceHistorySource, SourceType};

/// Series held in memory, keyed by ticker.
#[derive(Default)]
pub struct InMemoryPriceSource {
    series: DashMap<Ticker, AssetSeries>,
}

impl InMemoryPriceSource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source holding `series`.
    pub fn with_series(series: impl IntoIterator<Item = AssetSeries>) -> Self {
        let source = Self::new();
        for s in series {
            source.insert(s);
        }
        source
    }

    /// Insert or replace a series.
    pub fn insert(&self, series: AssetSeries) {
        self.series.insert(series.ticker().clone(), series);
    }

    /// Number of tickers held.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// Returns true if no series are held.
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

#[async_trait]
impl PriceHistorySource for InMemoryPriceSource {
    fn source_type(&self) -> SourceType {
        SourceType::Memory
    }

    async fn history(&self, ticker: &Ticker, start: Date, end: Date) -> SourceResult<Option<AssetSeries>> {
        Ok(self.series.get(ticker).map(|s| s.between(start, end)))
    }

    async fn available(&self) -> SourceResult<Vec<Ticker>> {
        let mut tickers: Vec<Ticker> = self.series.iter().map(|e| e.key().clone()).collect();
        tickers.sort();
        Ok(tickers)
    }
}
