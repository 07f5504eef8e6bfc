//! PriceBar — one period's closing observation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Closing price for a single symbol on a single trading day.
///
/// Bars are only trusted once they sit inside a [`PriceSeries`](super::PriceSeries),
/// whose constructor checks ordering and price sanity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub close: f64,
}

impl PriceBar {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}
