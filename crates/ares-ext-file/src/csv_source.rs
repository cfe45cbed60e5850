//! CSV price history source.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use dashmap::DashMap;
use serde::Deserialize;

use ares_core::types::PricePoint;
use ares_core::{AssetSeries, Date, Ticker};
use ares_traits::error::{SourceError, SourceResult};
use ares_traits::price_history::{PriceHistorySource, SourceType};

/// CSV record for one trading day.
#[derive(Debug, Deserialize)]
struct CloseRecord {
    #[serde(alias = "Date")]
    date: String,
    #[serde(alias = "Close", alias = "adj_close", alias = "Adj Close")]
    close: Option<f64>,
}

/// Price history read from `DIR/<TICKER>.csv`.
///
/// Each file is parsed on first use and cached; rows with an empty close
/// are skipped.
pub struct CsvPriceSource {
    directory: PathBuf,
    cache: DashMap<Ticker, AssetSeries>,
}

impl CsvPriceSource {
    /// Create a source over `directory`.
    pub fn new(directory: impl AsRef<Path>) -> SourceResult<Self> {
        let directory = directory.as_ref().to_path_buf();
        if !directory.is_dir() {
            return Err(SourceError::SourceNotAvailable(format!(
                "price directory {} does not exist",
                directory.display()
            )));
        }
        Ok(Self {
            directory,
            cache: DashMap::new(),
        })
    }

    /// The directory read from.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Drop cached series so files are re-read.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    fn path_for(&self, ticker: &Ticker) -> PathBuf {
        self.directory.join(format!("{}.csv", ticker.as_str()))
    }

    async fn load(&self, ticker: &Ticker) -> SourceResult<Option<AssetSeries>> {
        if let Some(series) = self.cache.get(ticker) {
            return Ok(Some(series.clone()));
        }
        let path = self.path_for(ticker);
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let series = parse_series(ticker, &text)?;
        tracing::debug!(ticker = %ticker, points = series.len(), "loaded price file");
        self.cache.insert(ticker.clone(), series.clone());
        Ok(Some(series))
    }
}

/// Parses `date,close` CSV text into a series.
fn parse_series(ticker: &Ticker, text: &str) -> SourceResult<AssetSeries> {
    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let mut points = Vec::new();
    for (row, result) in reader.deserialize().enumerate() {
        let record: CloseRecord = result
            .map_err(|e| SourceError::ParseError(format!("{ticker} row {}: {e}", row + 1)))?;
        let Some(close) = record.close else {
            continue;
        };
        let date = Date::parse(record.date.trim())
            .map_err(|e| SourceError::ParseError(format!("{ticker} row {}: {e}", row + 1)))?;
        points.push(PricePoint::new(date, close));
    }
    Ok(AssetSeries::from_unsorted(ticker.clone(), points)?)
}

#[async_trait]
impl PriceHistorySource for CsvPriceSource {
    fn source_type(&self) -> SourceType {
        SourceType::File
    }

    async fn history(&self, ticker: &Ticker, start: Date, end: Date) -> SourceResult<Option<AssetSeries>> {
        Ok(self.load(ticker).await?.map(|series| series.between(start, end)))
    }

    async fn available(&self) -> SourceResult<Vec<Ticker>> {
        let mut entries = tokio::fs::read_dir(&self.directory).await?;
        let mut tickers = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("csv") {
                continue;
            }
            if let Some(ticker) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| Ticker::parse(s).ok())
            {
                tickers.push(ticker);
            }
        }
        tickers.sort();
        Ok(tickers)
    }
}
