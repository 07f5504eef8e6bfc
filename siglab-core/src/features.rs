//! Classifier features extracted from an indicator frame.
//!
//! Each sample is (RSI, short MA, long MA, one-bar return) at bar t, labelled
//! 1 when the close at t+1 is strictly higher than at t. Bars with any
//! undefined feature, and the last bar (no next close), are skipped.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::indicators::IndicatorFrame;

pub const FEATURE_NAMES: [&str; 4] = ["rsi", "short_ma", "long_ma", "return"];
pub const N_FEATURES: usize = FEATURE_NAMES.len();

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub date: NaiveDate,
    pub features: [f64; N_FEATURES],
    /// 1 = next close up, 0 otherwise.
    pub target: u8,
}

/// Build the labelled sample set.
pub fn extract_samples(frame: &IndicatorFrame) -> Vec<Sample> {
    let rows = frame.rows();
    let mut samples = Vec::new();

    for t in 1..rows.len().saturating_sub(1) {
        let (prev, cur, next) = (&rows[t - 1], &rows[t], &rows[t + 1]);
        let (Some(rsi), Some(short), Some(long)) = (cur.rsi, cur.short_ma, cur.long_ma) else {
            continue;
        };
        let ret = cur.close / prev.close - 1.0;
        samples.push(Sample {
            date: cur.date,
            features: [rsi, short, long, ret],
            target: u8::from(next.close > cur.close),
        });
    }

    tracing::debug!(symbol = %frame.symbol, samples = samples.len(), "extracted features");
    samples
}

/// Features for the most recent bar, when all are defined. Used to predict
/// the next move after training.
pub fn latest_features(frame: &IndicatorFrame) -> Option<[f64; N_FEATURES]> {
    let rows = frame.rows();
    let n = rows.len();
    if n < 2 {
        return None;
    }
    let (prev, cur) = (&rows[n - 2], &rows[n - 1]);
    Some([cur.rsi?, cur.short_ma?, cur.long_ma?, cur.close / prev.close - 1.0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, compute_indicators, make_series};
    use crate::params::IndicatorParams;

    #[test]
    fn drops_incomplete_and_last_rows() {
        let frame = compute_indicators(
            &make_series(&[10.0, 10.0, 12.0, 9.0, 15.0]),
            &IndicatorParams::new(2, 3, 2),
        );
        let samples = extract_samples(&frame);
        // Rows 2..=4 are complete; row 4 has no next close.
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].date, frame.rows()[2].date);
        assert_eq!(samples[0].target, 0); // 12 -> 9
        assert_eq!(samples[1].target, 1); // 9 -> 15
        assert_approx(samples[0].features[3], 0.2, 1e-12);
        assert_approx(samples[1].features[0], 40.0, 1e-9);
    }

    #[test]
    fn flat_prices_yield_no_samples() {
        // RSI is undefined everywhere on a flat series.
        let frame = compute_indicators(&make_series(&[5.0; 10]), &IndicatorParams::new(2, 3, 2));
        assert!(extract_samples(&frame).is_empty());
        assert!(latest_features(&frame).is_none());
    }

    #[test]
    fn latest_features_for_last_bar() {
        let frame = compute_indicators(
            &make_series(&[10.0, 10.0, 12.0, 9.0, 15.0]),
            &IndicatorParams::new(2, 3, 2),
        );
        let f = latest_features(&frame).unwrap();
        assert_approx(f[1], 12.0, 1e-12);
        assert_approx(f[3], 15.0 / 9.0 - 1.0, 1e-12);
    }
}
