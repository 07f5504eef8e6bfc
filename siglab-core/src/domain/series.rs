//! PriceSeries — validated, strictly ascending sequence of bars.
//!
//! This is the only way price data enters the indicator engine. Invalid input
//! fails construction outright; nothing downstream ever sees a partial series.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::bar::PriceBar;

/// Reasons a price series is rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("price series for '{symbol}' is empty")]
    Empty { symbol: String },

    #[error("duplicate date {date} at index {index}")]
    DuplicateDate { index: usize, date: NaiveDate },

    #[error("date {current} at index {index} is earlier than previous date {previous}")]
    NonMonotonic {
        index: usize,
        previous: NaiveDate,
        current: NaiveDate,
    },

    #[error("close on {date} is not a finite number")]
    NonFiniteClose { date: NaiveDate },

    #[error("close on {date} must be positive, got {close}")]
    NonPositiveClose { date: NaiveDate, close: f64 },
}

/// Ordered closing prices for one symbol.
///
/// Invariants (checked by [`PriceSeries::new`]):
/// - at least one bar
/// - dates strictly increasing (gaps allowed, never filled)
/// - every close finite and > 0
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, bars: Vec<PriceBar>) -> Result<Self, SeriesError> {
        let symbol = symbol.into();
        if bars.is_empty() {
            return Err(SeriesError::Empty { symbol });
        }

        for (index, bar) in bars.iter().enumerate() {
            if !bar.close.is_finite() {
                return Err(SeriesError::NonFiniteClose { date: bar.date });
            }
            if bar.close <= 0.0 {
                return Err(SeriesError::NonPositiveClose {
                    date: bar.date,
                    close: bar.close,
                });
            }
            if index > 0 {
                let previous = bars[index - 1].date;
                if bar.date == previous {
                    return Err(SeriesError::DuplicateDate {
                        index,
                        date: bar.date,
                    });
                }
                if bar.date < previous {
                    return Err(SeriesError::NonMonotonic {
                        index,
                        previous,
                        current: bar.date,
                    });
                }
            }
        }

        Ok(Self { symbol, bars })
    }

    /// Build a series from `(date, close)` pairs.
    pub fn from_pairs(
        symbol: impl Into<String>,
        pairs: impl IntoIterator<Item = (NaiveDate, f64)>,
    ) -> Result<Self, SeriesError> {
        let bars = pairs
            .into_iter()
            .map(|(date, close)| PriceBar::new(date, close))
            .collect();
        Self::new(symbol, bars)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Always false for a constructed series; kept for clippy's `len_without_is_empty`.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_date(&self) -> NaiveDate {
        self.bars[0].date
    }

    pub fn last_date(&self) -> NaiveDate {
        self.bars[self.bars.len() - 1].date
    }

    pub fn closes(&self) -> impl Iterator<Item = f64> + '_ {
        self.bars.iter().map(|b| b.close)
    }

    /// Keep only the trailing `n` bars. Returns `self` unchanged if shorter.
    pub fn tail(&self, n: usize) -> PriceSeries {
        let start = self.bars.len().saturating_sub(n.max(1));
        PriceSeries {
            symbol: self.symbol.clone(),
            bars: self.bars[start..].to_vec(),
        }
    }
}

impl<'de> Deserialize<'de> for PriceSeries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            symbol: String,
            bars: Vec<PriceBar>,
        }
        let raw = Raw::deserialize(deserializer)?;
        PriceSeries::new(raw.symbol, raw.bars).map_err(serde::de::Error::custom)
    }
}
