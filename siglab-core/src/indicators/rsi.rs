//! Relative Strength Index (RSI).
//!
//! Simple (non-Wilder) averaging: average gain and average loss are the plain
//! trailing means of the last `period` price changes.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Lookback: period (a window of `period` changes needs `period + 1` closes).
//! Edge cases: avg_loss == 0 with gains → 100; no movement at all → undefined.

use super::Indicator;
use crate::domain::PriceBar;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        debug_assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period: period.max(1),
            name: format!("rsi_{period}"),
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<Option<f64>> {
        let n = bars.len();
        let mut result = vec![None; n];

        if n < self.period + 1 {
            return result;
        }

        // gains[i] / losses[i] hold the change from bar i to bar i+1
        let (gains, losses): (Vec<f64>, Vec<f64>) = bars
            .windows(2)
            .map(|w| {
                let change = w[1].close - w[0].close;
                (change.max(0.0), (-change).max(0.0))
            })
            .unzip();

        let period = self.period as f64;
        let mut gain_sum: f64 = gains[..self.period].iter().sum();
        let mut loss_sum: f64 = losses[..self.period].iter().sum();
        result[self.period] = rsi_from_averages(gain_sum / period, loss_sum / period);

        for i in (self.period + 1)..n {
            let entering = i - 1;
            let leaving = i - 1 - self.period;
            gain_sum += gains[entering] - gains[leaving];
            loss_sum += losses[entering] - losses[leaving];
            result[i] = rsi_from_averages(gain_sum / period, loss_sum / period);
        }

        result
    }
}

/// Map average gain/loss to an RSI value.
///
/// Sums are rolled, so values that should be exactly zero can drift by a few
/// ulps; anything within `ZERO_TOLERANCE` of zero is treated as zero.
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    const ZERO_TOLERANCE: f64 = 1e-12;
    let gain_zero = avg_gain.abs() < ZERO_TOLERANCE;
    let loss_zero = avg_loss.abs() < ZERO_TOLERANCE;

    match (gain_zero, loss_zero) {
        (true, true) => None,
        (false, true) => Some(100.0),
        (true, false) => Some(0.0),
        (false, false) => Some(100.0 - 100.0 / (1.0 + avg_gain / avg_loss)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars};

    #[test]
    fn rsi_all_gains_is_exactly_100() {
        let bars = make_bars(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0]);
        let result = Rsi::new(3).compute(&bars);
        assert_eq!(result[3], Some(100.0));
        assert_eq!(result[5], Some(100.0));
    }

    #[test]
    fn rsi_all_losses_is_zero() {
        let bars = make_bars(&[105.0, 104.0, 103.0, 102.0, 101.0, 100.0]);
        let result = Rsi::new(3).compute(&bars);
        assert_eq!(result[3], Some(0.0));
    }

    #[test]
    fn rsi_flat_prices_are_undefined() {
        let bars = make_bars(&[50.0, 50.0, 50.0, 50.0, 50.0]);
        let result = Rsi::new(3).compute(&bars);
        assert!(result.iter().all(Option::is_none));
    }

    #[test]
    fn rsi_mixed_uses_simple_means() {
        // Changes: +0.34, -0.25, -0.48, +0.72
        // RSI[3]: gains 0.34, losses 0.73 → 100 - 100/(1 + 0.34/0.73)
        // RSI[4]: window drops +0.34, adds +0.72 → gains 0.72, losses 0.73
        let bars = make_bars(&[44.0, 44.34, 44.09, 43.61, 44.33]);
        let result = Rsi::new(3).compute(&bars);

        assert!(result[..3].iter().all(Option::is_none));
        assert_approx(result[3].unwrap(), 100.0 - 100.0 / (1.0 + 0.34 / 0.73), 1e-9);
        assert_approx(result[4].unwrap(), 100.0 - 100.0 / (1.0 + 0.72 / 0.73), 1e-9);
    }

    #[test]
    fn rsi_recovers_definition_after_flat_stretch() {
        // Window 2: [flat, flat] undefined, then a gain enters
        let bars = make_bars(&[10.0, 10.0, 10.0, 11.0]);
        let result = Rsi::new(2).compute(&bars);
        assert_eq!(result[2], None);
        assert_eq!(result[3], Some(100.0));
    }

    #[test]
    fn rsi_bounds() {
        let bars = make_bars(&[100.0, 105.0, 98.0, 110.0, 95.0, 115.0, 90.0, 120.0]);
        let result = Rsi::new(3).compute(&bars);
        for (i, v) in result.iter().enumerate() {
            if let Some(v) = v {
                assert!((0.0..=100.0).contains(v), "RSI out of bounds at bar {i}: {v}");
            }
        }
    }

    #[test]
    fn rsi_lookback() {
        assert_eq!(Rsi::new(14).lookback(), 14);
        assert_eq!(Rsi::new(14).name(), "rsi_14");
    }
}
