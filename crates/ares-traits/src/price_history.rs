//! Price history source trait.
//!
//! A source answers one question: the adjusted-close history of a ticker
//! between two dates, both inclusive. Unknown tickers are `Ok(None)`, not errors;
//! the engine reports them as invalid tickers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use ares_core::{AssetSeries, Date, Ticker};

use crate::error::SourceResult;

/// Where a source gets its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceType {
    /// File-based (CSV)
    File,
    /// Held in memory (tests, fixtures)
    Memory,
    /// Remote vendor API
    Remote,
}

/// Provider of daily adjusted-close histories.
#[async_trait]
pub trait PriceHistorySource: Send + Sync {
    /// Source type.
    fn source_type(&self) -> SourceType;

    /// History of `ticker` in `start..=end`, or `None` if unknown.
    async fn history(&self, ticker: &Ticker, start: Date, end: Date) -> SourceResult<Option<AssetSeries>>;

    /// Histories for several tickers, in request order.
    async fn histories(
        &self,
        tickers: &[Ticker],
        start: Date,
        end: Date,
    ) -> SourceResult<Vec<(Ticker, Option<AssetSeries>)>> {
        let mut out = Vec::with_capacity(tickers.len());
        for ticker in tickers {
            out.push((ticker.clone(), self.history(ticker, start, end).await?));
        }
        Ok(out)
    }

    /// Every ticker the source can serve.
    async fn available(&self) -> SourceResult<Vec<Ticker>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use ares_core::types::PricePoint;

    struct Fixed;

    #[async_trait]
    impl PriceHistorySource for Fixed {
        fn source_type(&self) -> SourceType {
            SourceType::Memory
        }

        async fn history(&self, ticker: &Ticker, start: Date, _end: Date) -> SourceResult<Option<AssetSeries>> {
            if ticker.as_str() != "SPY" {
                return Ok(None);
            }
            let series = AssetSeries::new(ticker.clone(), vec![PricePoint::new(start, 400.0)])?;
            Ok(Some(series))
        }

        async fn available(&self) -> SourceResult<Vec<Ticker>> {
            Ok(vec![Ticker::parse("SPY")?])
        }
    }

    #[tokio::test]
    async fn test_default_histories_keeps_order() {
        let start = Date::from_ymd(2024, 1, 2).unwrap();
        let tickers = vec![Ticker::parse("QQQ").unwrap(), Ticker::parse("SPY").unwrap()];
        let result = Fixed.histories(&tickers, start, start).await.unwrap();
        assert_eq!(result[0].0.as_str(), "QQQ");
        assert!(result[0].1.is_none());
        assert_eq!(result[1].1.as_ref().unwrap().len(), 1);
    }
}
