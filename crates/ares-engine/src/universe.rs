//! Curated ticker universe grouped by sector.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use ares_core::Ticker;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Sector of the curated universe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Sector {
    /// Technology
    Technology,
    /// Finance
    Finance,
    /// Healthcare
    Healthcare,
    /// Energy
    Energy,
    /// Consumer
    Consumer,
    /// Industrials
    Industrials,
    /// Exchange-traded funds
    #[serde(rename = "ETFs")]
    Etfs,
}

impl Sector {
    /// Every sector, in display order.
    pub const ALL: [Sector; 7] = [
        Sector::Technology,
        Sector::Finance,
        Sector::Healthcare,
        Sector::Energy,
        Sector::Consumer,
        Sector::Industrials,
        Sector::Etfs,
    ];

    /// Display name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Sector::Technology => "Technology",
            Sector::Finance => "Finance",
            Sector::Healthcare => "Healthcare",
            Sector::Energy => "Energy",
            Sector::Consumer => "Consumer",
            Sector::Industrials => "Industrials",
            Sector::Etfs => "ETFs",
        }
    }

    /// Symbols in this sector.
    #[must_use]
    pub fn symbols(self) -> &'static [&'static str] {
        match self {
            Sector::Technology => &["AAPL", "MSFT", "GOOGL", "NVDA", "META", "AMD", "AVGO", "TSM"],
            Sector::Finance => &["JPM", "BAC", "GS", "V", "MA", "BLK", "MS", "WFC"],
            Sector::Healthcare => &["JNJ", "UNH", "PFE", "MRK", "ABBV", "LLY", "TMO", "ABT"],
            Sector::Energy => &["XOM", "CVX", "COP", "SLB", "EOG", "MPC", "PSX", "VLO"],
            Sector::Consumer => &["AMZN", "TSLA", "HD", "MCD", "NKE", "SBUX", "TGT", "COST"],
            Sector::Industrials => &["BA", "CAT", "GE", "MMM", "HON", "UPS", "LMT", "RTX"],
            Sector::Etfs => &["SPY", "QQQ", "VTI", "GLD", "TLT", "VNQ", "IWM", "EFA"],
        }
    }

    /// Sector of `ticker`, if it is in the universe.
    #[must_use]
    pub fn of(ticker: &Ticker) -> Option<Sector> {
        Self::ALL
            .into_iter()
            .find(|s| s.symbols().contains(&ticker.as_str()))
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Sector {
    type Err = EngineError;

    /// Case-insensitive match on the display name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|sector| sector.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| EngineError::validation("sector", format!("unknown sector '{wanted}'")))
    }
}

/// Universe grouped by sector name, optionally restricted to one sector.
#[must_use]
pub fn universe(sector: Option<Sector>) -> BTreeMap<&'static str, Vec<&'static str>> {
    Sector::ALL
        .into_iter()
        .filter(|s| sector.map_or(true, |wanted| wanted == *s))
        .map(|s| (s.name(), s.symbols().to_vec()))
        .collect()
}

/// Removes tickers belonging to any excluded sector.
///
/// Tickers outside the curated universe are kept.
#[must_use]
pub fn exclude_sectors(tickers: Vec<Ticker>, excluded: &[Sector]) -> Vec<Ticker> {
    if excluded.is_empty() {
        return tickers;
    }
    tickers
        .into_iter()
        .filter(|t| Sector::of(t).map_or(true, |s| !excluded.contains(&s)))
        .collect()
}
