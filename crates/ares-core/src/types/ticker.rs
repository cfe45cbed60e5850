//! Ticker symbols and the per-request ticker ↔ position table.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::{CoreError, CoreResult};

/// Maximum accepted symbol length.
const MAX_SYMBOL_LEN: usize = 16;

/// A normalized instrument symbol (trimmed, upper-case).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    /// Parses and normalizes a symbol.
    ///
    /// Accepts ASCII letters, digits and `.`, `-`, `^`, `=` (index and
    /// share-class notation such as `BRK.B` or `^GSPC`).
    pub fn parse(symbol: &str) -> CoreResult<Self> {
        let normalized = symbol.trim().to_ascii_uppercase();
        if normalized.is_empty() {
            return Err(CoreError::invalid_ticker(symbol, "empty symbol"));
        }
        if normalized.len() > MAX_SYMBOL_LEN {
            return Err(CoreError::invalid_ticker(symbol, "symbol too long"));
        }
        if let Some(c) = normalized
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '=')))
        {
            return Err(CoreError::invalid_ticker(
                symbol,
                format!("illegal character '{c}'"),
            ));
        }
        Ok(Self(normalized))
    }

    /// Returns the symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Ticker {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Ticker> for String {
    fn from(ticker: Ticker) -> Self {
        ticker.0
    }
}

/// Bidirectional ticker ↔ integer position table.
///
/// Built once per request. Every vector and matrix in the pipeline is indexed
/// by position; the table is consulted only when reading inputs and labelling
/// outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickerIndex {
    tickers: Vec<Ticker>,
    positions: HashMap<Ticker, usize>,
}

impl TickerIndex {
    /// Creates an index preserving the given order.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::DuplicateTicker` if a ticker appears twice.
    pub fn new(tickers: Vec<Ticker>) -> CoreResult<Self> {
        let mut positions = HashMap::with_capacity(tickers.len());
        for (i, ticker) in tickers.iter().enumerate() {
            if positions.insert(ticker.clone(), i).is_some() {
                return Err(CoreError::DuplicateTicker {
                    ticker: ticker.to_string(),
                });
            }
        }
        Ok(Self { tickers, positions })
    }

    /// Number of tickers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    /// Returns true if the index holds no tickers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }

    /// Position of a ticker.
    #[must_use]
    pub fn position(&self, ticker: &Ticker) -> Option<usize> {
        self.positions.get(ticker).copied()
    }

    /// Ticker at a position.
    #[must_use]
    pub fn ticker(&self, position: usize) -> Option<&Ticker> {
        self.tickers.get(position)
    }

    /// Tickers in position order.
    #[must_use]
    pub fn tickers(&self) -> &[Ticker] {
        &self.tickers
    }

    /// Iterates over `(position, ticker)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Ticker)> {
        self.tickers.iter().enumerate()
    }

    /// Labels a position-indexed slice with tickers.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::DimensionMismatch` if lengths differ.
    pub fn label<T: Clone>(&self, values: &[T]) -> CoreResult<Vec<(Ticker, T)>> {
        if values.len() != self.len() {
            return Err(CoreError::dimension_mismatch(format!(
                "{} values for {} tickers",
                values.len(),
                self.len()
            )));
        }
        Ok(self
            .tickers
            .iter()
            .cloned()
            .zip(values.iter().cloned())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> Ticker {
        Ticker::parse(s).unwrap()
    }

    #[test]
    fn test_ticker_normalization() {
        assert_eq!(t(" aapl ").as_str(), "AAPL");
        assert_eq!(t("brk.b").as_str(), "BRK.B");
        assert_eq!(t("^gspc").as_str(), "^GSPC");
    }

    #[test]
    fn test_ticker_rejects_invalid() {
        assert!(Ticker::parse("   ").is_err());
        assert!(Ticker::parse("AA PL").is_err());
        assert!(Ticker::parse("A$").is_err());
        assert!(Ticker::parse("ABCDEFGHIJKLMNOPQ").is_err());
    }

    #[test]
    fn test_ticker_serde() {
        let ticker: Ticker = serde_json::from_str("\"msft\"").unwrap();
        assert_eq!(ticker.as_str(), "MSFT");
        assert!(serde_json::from_str::<Ticker>("\"\"").is_err());
    }

    #[test]
    fn test_index_bidirectional() {
        let index = TickerIndex::new(vec![t("AAPL"), t("MSFT"), t("JPM")]).unwrap();
        assert_eq!(index.len(), 3);
        assert_eq!(index.position(&t("JPM")), Some(2));
        assert_eq!(index.ticker(1), Some(&t("MSFT")));
        assert_eq!(index.position(&t("XOM")), None);
        assert!(index.ticker(3).is_none());
    }

    #[test]
    fn test_index_rejects_duplicates() {
        let result = TickerIndex::new(vec![t("AAPL"), t("aapl")]);
        assert!(matches!(result, Err(CoreError::DuplicateTicker { .. })));
    }

    #[test]
    fn test_label() {
        let index = TickerIndex::new(vec![t("A"), t("B")]).unwrap();
        let labelled = index.label(&[0.25, 0.75]).unwrap();
        assert_eq!(labelled[1], (t("B"), 0.75));
        assert!(index.label(&[1.0]).is_err());
    }
}
