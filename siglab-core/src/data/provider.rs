//! Data provider trait and structured error types.
//!
//! The DataProvider trait abstracts over data sources (Yahoo Finance, a local
//! CSV file, a seeded random walk) so callers can swap them and tests can run
//! offline.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{PriceBar, PriceSeries, SeriesError};

/// Structured error types for data operations.
///
/// Displayable in both CLI and TUI contexts.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("provider returned HTTP {status}")]
    Http { status: u16 },

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("no bars for '{symbol}' between {start} and {end}")]
    NoData {
        symbol: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("CSV error in {path}: {message}")]
    Csv { path: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid series: {0}")]
    InvalidSeries(#[from] SeriesError),

    #[error("data error: {0}")]
    Other(String),
}

impl DataError {
    /// Worth retrying later: the request itself was fine.
    pub fn is_transient(&self) -> bool {
        match self {
            DataError::NetworkUnreachable(_) | DataError::RateLimited { .. } => true,
            DataError::Http { status } => *status >= 500,
            _ => false,
        }
    }
}

/// Where the data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Yahoo,
    Csv,
    Synthetic,
}

impl DataSource {
    pub fn label(&self) -> &'static str {
        match self {
            DataSource::Yahoo => "yahoo",
            DataSource::Csv => "csv",
            DataSource::Synthetic => "synthetic",
        }
    }
}

impl std::str::FromStr for DataSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "yahoo" => Ok(DataSource::Yahoo),
            "csv" => Ok(DataSource::Csv),
            "synthetic" => Ok(DataSource::Synthetic),
            other => Err(format!("unknown data source '{other}' (expected yahoo, csv or synthetic)")),
        }
    }
}

/// Result of a successful data fetch for a single symbol.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub symbol: String,
    pub bars: Vec<PriceBar>,
    pub source: DataSource,
}

impl FetchResult {
    /// Validate the fetched bars as they are. Out-of-order or repeated dates
    /// fail with [`DataError::InvalidSeries`]; nothing is reordered or dropped.
    pub fn into_series(self) -> Result<PriceSeries, DataError> {
        Ok(PriceSeries::new(self.symbol, self.bars)?)
    }
}

/// Trait for data providers.
pub trait DataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch daily closes for a symbol over an inclusive date range.
    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<FetchResult, DataError>;

    /// Fetch and validate in one step.
    fn fetch_series(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries, DataError> {
        let result = self.fetch(symbol, start, end)?;
        if result.bars.is_empty() {
            return Err(DataError::NoData {
                symbol: symbol.to_string(),
                start,
                end,
            });
        }
        result.into_series()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, day).unwrap()
    }

    #[test]
    fn into_series_rejects_unordered_and_repeated_dates() {
        let unordered = FetchResult {
            symbol: "SPY".into(),
            bars: vec![PriceBar::new(d(3), 11.0), PriceBar::new(d(1), 10.0)],
            source: DataSource::Csv,
        };
        assert!(matches!(
            unordered.into_series(),
            Err(DataError::InvalidSeries(SeriesError::NonMonotonic { index: 1, .. }))
        ));

        let repeated = FetchResult {
            symbol: "SPY".into(),
            bars: vec![
                PriceBar::new(d(1), 10.0),
                PriceBar::new(d(3), 11.0),
                PriceBar::new(d(3), 11.5),
            ],
            source: DataSource::Csv,
        };
        assert!(matches!(
            repeated.into_series(),
            Err(DataError::InvalidSeries(SeriesError::DuplicateDate { index: 2, .. }))
        ));
    }

    #[test]
    fn into_series_surfaces_validation_errors() {
        let result = FetchResult {
            symbol: "SPY".into(),
            bars: vec![PriceBar::new(d(1), -1.0)],
            source: DataSource::Csv,
        };
        assert!(matches!(result.into_series(), Err(DataError::InvalidSeries(_))));
    }

    #[test]
    fn source_parses_case_insensitively() {
        assert_eq!("Yahoo".parse::<DataSource>().unwrap(), DataSource::Yahoo);
        assert_eq!("synthetic".parse::<DataSource>().unwrap(), DataSource::Synthetic);
        assert!("parquet".parse::<DataSource>().is_err());
    }

    #[test]
    fn transient_errors() {
        assert!(DataError::RateLimited { retry_after_secs: 5 }.is_transient());
        assert!(DataError::Http { status: 502 }.is_transient());
        assert!(!DataError::Http { status: 403 }.is_transient());
        assert!(!DataError::SymbolNotFound { symbol: "X".into() }.is_transient());
    }
}
