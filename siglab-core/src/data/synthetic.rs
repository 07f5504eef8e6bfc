//! Seeded random-walk provider for offline demos and tests.

use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::provider::{DataError, DataProvider, DataSource, FetchResult};
use crate::domain::PriceBar;

const START_PRICE: f64 = 100.0;
/// Maximum absolute daily return.
const MAX_STEP: f64 = 0.02;

/// Geometric random walk on weekdays, starting at 100 with daily returns
/// within +/-2%. The same seed, symbol and range always produce the same bars.
#[derive(Debug, Clone)]
pub struct SyntheticProvider {
    seed: u64,
}

impl SyntheticProvider {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Derive a per-symbol seed so different symbols diverge.
    fn symbol_seed(&self, symbol: &str) -> u64 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.seed.to_le_bytes());
        hasher.update(symbol.as_bytes());
        let mut buf = [0u8; 8];
        buf.copy_from_slice(&hasher.finalize().as_bytes()[..8]);
        u64::from_le_bytes(buf)
    }
}

fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

impl DataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<FetchResult, DataError> {
        let mut rng = StdRng::seed_from_u64(self.symbol_seed(symbol));
        let mut price = START_PRICE;
        let mut bars = Vec::new();

        for date in start.iter_days().take_while(|d| *d <= end).filter(|d| is_business_day(*d)) {
            bars.push(PriceBar::new(date, price));
            let step: f64 = rng.gen_range(-MAX_STEP..=MAX_STEP);
            price *= 1.0 + step;
        }

        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars,
            source: DataSource::Synthetic,
        })
    }
}
