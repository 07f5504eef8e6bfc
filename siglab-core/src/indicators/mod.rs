//! Indicator engine.
//!
//! Two concrete indicators (SMA, RSI) implement the `Indicator` trait. The
//! engine runs them once over a validated `PriceSeries` and zips the results
//! into an `IndicatorFrame`. Warm-up bars are `None`, never a NaN sentinel.

pub mod frame;
pub mod rsi;
pub mod sma;

pub use frame::{compute_indicators, IndicatorFrame, IndicatorKind, IndicatorRow, InsufficientData};
pub use rsi::Rsi;
pub use sma::Sma;

use crate::domain::PriceBar;

/// Trait for indicators.
///
/// Indicators take the full bar series and produce an output series of the
/// same length. The first `lookback()` values are `None` (warm-up), and any
/// later value may also be `None` when the formula is undefined at that bar.
///
/// # Look-ahead guard
/// No value at bar t may depend on bar t+1 or later. Every indicator must
/// produce identical values on a truncated prefix of the series.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "sma_20", "rsi_14").
    fn name(&self) -> &str;

    /// Number of bars before the indicator can produce a value.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar series.
    fn compute(&self, bars: &[PriceBar]) -> Vec<Option<f64>>;
}

/// Create bars on consecutive days from close prices, for testing.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<PriceBar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceBar::new(base_date + chrono::Duration::days(i as i64), close))
        .collect()
}

/// Build a validated series from close prices, for testing.
#[cfg(test)]
pub fn make_series(closes: &[f64]) -> crate::domain::PriceSeries {
    crate::domain::PriceSeries::new("TEST", make_bars(closes)).unwrap()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;

#[cfg(test)]
mod tests {
    use super::*;

    /// Truncating the series must not change any value already computed.
    #[test]
    fn indicators_have_no_lookahead() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0).collect();
        let full = make_bars(&closes);
        let indicators: Vec<Box<dyn Indicator>> =
            vec![Box::new(Sma::new(5)), Box::new(Sma::new(12)), Box::new(Rsi::new(6))];

        for ind in &indicators {
            let full_out = ind.compute(&full);
            for cut in [10, 20, 33] {
                let partial = ind.compute(&full[..cut]);
                for i in 0..cut {
                    match (partial[i], full_out[i]) {
                        (Some(a), Some(b)) => assert_approx(a, b, 1e-9),
                        (a, b) => assert_eq!(a, b, "{} differs at {i} (cut {cut})", ind.name()),
                    }
                }
            }
        }
    }
}
