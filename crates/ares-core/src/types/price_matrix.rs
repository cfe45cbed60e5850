//! Aligned multi-asset price matrix.
//!
//! Series arrive with their own trading calendars. Alignment drops series
//! with too little coverage and trims the rest to the dates every remaining
//! series traded on.

use nalgebra::DMatrix;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use super::{AssetSeries, Date, Ticker, TickerIndex};
use crate::config::AlignmentPolicy;
use crate::error::{CoreError, CoreResult};

/// A series excluded during alignment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DroppedSeries {
    /// Ticker of the excluded series.
    pub ticker: Ticker,
    /// Fraction of the union date axis the series covered.
    pub coverage: f64,
}

/// Result of aligning a set of series.
#[derive(Debug, Clone)]
pub struct AlignedPrices {
    /// The aligned matrix.
    pub matrix: PriceMatrix,
    /// Series excluded for insufficient coverage.
    pub dropped: Vec<DroppedSeries>,
}

/// Prices on a common date axis.
///
/// Rows are trading days (strictly increasing), columns are tickers in
/// [`TickerIndex`] order.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceMatrix {
    dates: Vec<Date>,
    index: TickerIndex,
    prices: DMatrix<f64>,
    /// First date of each column's source series, before trimming.
    history_starts: Vec<Date>,
}

impl PriceMatrix {
    /// Aligns series to their common trading-day intersection.
    ///
    /// Series covering less than `policy.min_coverage` of the union date
    /// axis are dropped first, so one short-lived listing cannot shrink the
    /// window for everyone else.
    pub fn align(series: &[AssetSeries], policy: &AlignmentPolicy) -> CoreResult<AlignedPrices> {
        policy.validate()?;

        let union: BTreeSet<Date> = series
            .iter()
            .flat_map(|s| s.points().iter().map(|p| p.date))
            .collect();
        let union_len = union.len().max(1) as f64;

        let mut kept = Vec::new();
        let mut dropped = Vec::new();
        for s in series {
            let coverage = s.len() as f64 / union_len;
            if s.is_empty() || coverage + f64::EPSILON < policy.min_coverage {
                log::debug!("dropping {} with coverage {:.3}", s.ticker(), coverage);
                dropped.push(DroppedSeries {
                    ticker: s.ticker().clone(),
                    coverage,
                });
            } else {
                kept.push(s);
            }
        }

        let index = TickerIndex::new(kept.iter().map(|s| s.ticker().clone()).collect())?;

        let lookups: Vec<BTreeMap<Date, f64>> = kept
            .iter()
            .map(|s| s.points().iter().map(|p| (p.date, p.close)).collect())
            .collect();

        let dates: Vec<Date> = match lookups.split_first() {
            Some((first, rest)) => first
                .keys()
                .filter(|d| rest.iter().all(|m| m.contains_key(d)))
                .copied()
                .collect(),
            None => Vec::new(),
        };

        let prices = DMatrix::from_fn(dates.len(), kept.len(), |r, c| lookups[c][&dates[r]]);
        let history_starts = kept
            .iter()
            .map(|s| s.first_date().unwrap_or_else(|| Date::from(chrono::NaiveDate::MIN)))
            .collect();

        Ok(AlignedPrices {
            matrix: Self {
                dates,
                index,
                prices,
                history_starts,
            },
            dropped,
        })
    }

    /// Builds a matrix from already-aligned columns.
    ///
    /// # Errors
    ///
    /// Fails on dimension mismatch, unordered dates, duplicate tickers or an
    /// invalid price.
    pub fn from_columns(
        dates: Vec<Date>,
        tickers: Vec<Ticker>,
        columns: Vec<Vec<f64>>,
    ) -> CoreResult<Self> {
        if tickers.len() != columns.len() {
            return Err(CoreError::dimension_mismatch(format!(
                "{} tickers but {} columns",
                tickers.len(),
                columns.len()
            )));
        }
        if let Some(pair) = dates.windows(2).find(|w| w[1] <= w[0]) {
            return Err(CoreError::UnorderedSeries {
                ticker: "<axis>".to_string(),
                date: pair[1].to_string(),
            });
        }
        for (ticker, column) in tickers.iter().zip(&columns) {
            if column.len() != dates.len() {
                return Err(CoreError::dimension_mismatch(format!(
                    "column {} has {} rows, axis has {}",
                    ticker,
                    column.len(),
                    dates.len()
                )));
            }
            if let Some((row, &value)) = column
                .iter()
                .enumerate()
                .find(|(_, v)| !(v.is_finite() && **v > 0.0))
            {
                return Err(CoreError::InvalidPrice {
                    ticker: ticker.to_string(),
                    date: dates[row].to_string(),
                    value,
                });
            }
        }

        let index = TickerIndex::new(tickers)?;
        let prices = DMatrix::from_fn(dates.len(), columns.len(), |r, c| columns[c][r]);
        let start = dates
            .first()
            .copied()
            .unwrap_or_else(|| Date::from(chrono::NaiveDate::MIN));
        let history_starts = vec![start; columns.len()];

        Ok(Self {
            dates,
            index,
            prices,
            history_starts,
        })
    }

    /// The date axis.
    #[must_use]
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// The ticker table.
    #[must_use]
    pub fn index(&self) -> &TickerIndex {
        &self.index
    }

    /// Dense prices, rows = days, columns = tickers.
    #[must_use]
    pub fn prices(&self) -> &DMatrix<f64> {
        &self.prices
    }

    /// Number of trading days.
    #[must_use]
    pub fn n_days(&self) -> usize {
        self.dates.len()
    }

    /// Number of tickers.
    #[must_use]
    pub fn n_assets(&self) -> usize {
        self.index.len()
    }

    /// Prices of one column.
    #[must_use]
    pub fn column(&self, position: usize) -> Vec<f64> {
        self.prices.column(position).iter().copied().collect()
    }

    /// Prices of one ticker.
    #[must_use]
    pub fn column_of(&self, ticker: &Ticker) -> Option<Vec<f64>> {
        self.index.position(ticker).map(|i| self.column(i))
    }

    /// Ticker whose source history starts latest, i.e. the one that bounds
    /// the aligned window.
    #[must_use]
    pub fn latest_start(&self) -> Option<&Ticker> {
        self.history_starts
            .iter()
            .enumerate()
            .max_by_key(|(_, d)| **d)
            .and_then(|(i, _)| self.index.ticker(i))
    }

    /// A matrix restricted to the given tickers, in the given order.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::UnknownTicker` for a ticker not in the matrix.
    pub fn select(&self, tickers: &[Ticker]) -> CoreResult<Self> {
        let positions = tickers
            .iter()
            .map(|t| {
                self.index.position(t).ok_or_else(|| CoreError::UnknownTicker {
                    ticker: t.to_string(),
                })
            })
            .collect::<CoreResult<Vec<_>>>()?;

        Ok(Self {
            dates: self.dates.clone(),
            index: TickerIndex::new(tickers.to_vec())?,
            prices: self.prices.select_columns(positions.iter()),
            history_starts: positions.iter().map(|&i| self.history_starts[i]).collect(),
        })
    }

    /// The last `rows` trading days (all of them if fewer exist).
    #[must_use]
    pub fn tail(&self, rows: usize) -> Self {
        let rows = rows.min(self.n_days());
        let start = self.n_days() - rows;
        Self {
            dates: self.dates[start..].to_vec(),
            index: self.index.clone(),
            prices: self.prices.rows(start, rows).into_owned(),
            history_starts: self.history_starts.clone(),
        }
    }
}
