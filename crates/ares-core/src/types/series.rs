//! Single-instrument price history.

use serde::{Deserialize, Serialize};

use super::{Date, Ticker};
use crate::error::{CoreError, CoreResult};

/// One adjusted-close observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Trading date.
    pub date: Date,
    /// Adjusted close.
    pub close: f64,
}

impl PricePoint {
    /// Creates a new observation.
    #[must_use]
    pub fn new(date: Date, close: f64) -> Self {
        Self { date, close }
    }
}

/// Adjusted-close history of one ticker.
///
/// Dates are strictly increasing and every close is finite and positive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetSeries {
    ticker: Ticker,
    points: Vec<PricePoint>,
}

impl AssetSeries {
    /// Creates a series from observations already in date order.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::UnorderedSeries` if dates are not strictly
    /// increasing, or `CoreError::InvalidPrice` for a non-positive or
    /// non-finite close.
    pub fn new(ticker: Ticker, points: Vec<PricePoint>) -> CoreResult<Self> {
        for pair in points.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(CoreError::UnorderedSeries {
                    ticker: ticker.to_string(),
                    date: pair[1].date.to_string(),
                });
            }
        }
        if let Some(bad) = points.iter().find(|p| !(p.close.is_finite() && p.close > 0.0)) {
            return Err(CoreError::InvalidPrice {
                ticker: ticker.to_string(),
                date: bad.date.to_string(),
                value: bad.close,
            });
        }
        Ok(Self { ticker, points })
    }

    /// Creates a series from observations in any order.
    ///
    /// Observations are sorted by date; a repeated date is still an error.
    pub fn from_unsorted(ticker: Ticker, mut points: Vec<PricePoint>) -> CoreResult<Self> {
        points.sort_by_key(|p| p.date);
        Self::new(ticker, points)
    }

    /// The series ticker.
    #[must_use]
    pub fn ticker(&self) -> &Ticker {
        &self.ticker
    }

    /// Observations in date order.
    #[must_use]
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Number of observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if there are no observations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Date of the first observation.
    #[must_use]
    pub fn first_date(&self) -> Option<Date> {
        self.points.first().map(|p| p.date)
    }

    /// Date of the last observation.
    #[must_use]
    pub fn last_date(&self) -> Option<Date> {
        self.points.last().map(|p| p.date)
    }

    /// Keeps only observations in `start..=end`.
    #[must_use]
    pub fn between(&self, start: Date, end: Date) -> Self {
        Self {
            ticker: self.ticker.clone(),
            points: self
                .points
                .iter()
                .filter(|p| p.date >= start && p.date <= end)
                .copied()
                .collect(),
        }
    }
}
