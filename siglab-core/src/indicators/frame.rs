//! IndicatorFrame — the price series with MA and RSI columns attached.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Indicator, Rsi, Sma};
use crate::domain::PriceSeries;
use crate::params::IndicatorParams;

/// Which indicator column a report refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorKind {
    ShortMa,
    LongMa,
    Rsi,
}

impl IndicatorKind {
    pub fn label(&self) -> &'static str {
        match self {
            IndicatorKind::ShortMa => "short MA",
            IndicatorKind::LongMa => "long MA",
            IndicatorKind::Rsi => "RSI",
        }
    }
}

/// An indicator column that is undefined for the whole series because the
/// series is shorter than the indicator needs. Reported, never raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsufficientData {
    pub indicator: IndicatorKind,
    /// Bars needed before the first defined value.
    pub required: usize,
    /// Bars actually available.
    pub available: usize,
}

impl std::fmt::Display for InsufficientData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} needs {} bars, series has {}; column is entirely undefined",
            self.indicator.label(),
            self.required,
            self.available
        )
    }
}

/// One bar with its indicator values. `None` means "not available yet".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    pub date: NaiveDate,
    pub close: f64,
    pub short_ma: Option<f64>,
    pub long_ma: Option<f64>,
    pub rsi: Option<f64>,
}

impl IndicatorRow {
    /// True when every indicator column is defined at this bar.
    pub fn is_complete(&self) -> bool {
        self.short_ma.is_some() && self.long_ma.is_some() && self.rsi.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorFrame {
    pub symbol: String,
    pub params: IndicatorParams,
    rows: Vec<IndicatorRow>,
}

impl IndicatorFrame {
    /// Assemble a frame from precomputed rows. Used by tests and by callers
    /// that replay stored indicator values.
    pub fn from_rows(symbol: impl Into<String>, params: IndicatorParams, rows: Vec<IndicatorRow>) -> Self {
        Self {
            symbol: symbol.into(),
            params,
            rows,
        }
    }

    pub fn rows(&self) -> &[IndicatorRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn last(&self) -> Option<&IndicatorRow> {
        self.rows.last()
    }

    /// Columns that are undefined across the entire frame because the
    /// series is too short for their window.
    pub fn insufficient(&self) -> Vec<InsufficientData> {
        let available = self.rows.len();
        let p = &self.params;
        [
            (IndicatorKind::ShortMa, p.short_window),
            (IndicatorKind::LongMa, p.long_window),
            (IndicatorKind::Rsi, p.rsi_window + 1),
        ]
        .into_iter()
        .filter(|&(_, required)| available < required)
        .map(|(indicator, required)| InsufficientData {
            indicator,
            required,
            available,
        })
        .collect()
    }
}

/// Run the indicator engine over a validated series.
///
/// Pure: same series and params always give the same frame. Params are
/// assumed validated (`IndicatorParams::validate`).
pub fn compute_indicators(series: &PriceSeries, params: &IndicatorParams) -> IndicatorFrame {
    let bars = series.bars();
    let short = Sma::new(params.short_window).compute(bars);
    let long = Sma::new(params.long_window).compute(bars);
    let rsi = Rsi::new(params.rsi_window).compute(bars);

    let rows = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| IndicatorRow {
            date: bar.date,
            close: bar.close,
            short_ma: short[i],
            long_ma: long[i],
            rsi: rsi[i],
        })
        .collect();

    tracing::debug!(
        symbol = series.symbol(),
        bars = series.len(),
        short = params.short_window,
        long = params.long_window,
        rsi = params.rsi_window,
        "computed indicators"
    );

    IndicatorFrame::from_rows(series.symbol(), *params, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_series};

    #[test]
    fn frame_length_matches_series() {
        let series = make_series(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let frame = compute_indicators(&series, &IndicatorParams::new(2, 3, 2));
        assert_eq!(frame.len(), series.len());
        assert_eq!(frame.symbol, "TEST");
    }

    #[test]
    fn warmup_ranges_are_undefined() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64 * 0.5 - (i % 3) as f64).collect();
        let frame = compute_indicators(&make_series(&closes), &IndicatorParams::default());
        for (i, row) in frame.rows().iter().enumerate() {
            assert_eq!(row.short_ma.is_none(), i < 19, "short MA at {i}");
            assert_eq!(row.long_ma.is_none(), i < 49, "long MA at {i}");
            if i < 14 {
                assert!(row.rsi.is_none(), "RSI at {i}");
            }
        }
        assert!(frame.insufficient().is_empty());
    }

    #[test]
    fn literal_scenario_indicator_values() {
        let frame = compute_indicators(
            &make_series(&[10.0, 10.0, 12.0, 9.0, 15.0]),
            &IndicatorParams::new(2, 3, 2),
        );
        let r = frame.rows();
        assert_eq!(r[0].short_ma, None);
        assert_approx(r[1].short_ma.unwrap(), 10.0, 1e-12);
        assert_approx(r[2].short_ma.unwrap(), 11.0, 1e-12);
        assert_approx(r[3].short_ma.unwrap(), 10.5, 1e-12);
        assert_approx(r[4].short_ma.unwrap(), 12.0, 1e-12);

        assert_eq!(r[1].long_ma, None);
        assert_approx(r[2].long_ma.unwrap(), 32.0 / 3.0, 1e-12);
        assert_approx(r[3].long_ma.unwrap(), 31.0 / 3.0, 1e-12);
        assert_approx(r[4].long_ma.unwrap(), 12.0, 1e-12);

        assert_eq!(r[1].rsi, None);
        assert_eq!(r[2].rsi, Some(100.0));
        assert_approx(r[3].rsi.unwrap(), 40.0, 1e-9);
        assert_approx(r[4].rsi.unwrap(), 200.0 / 3.0, 1e-9);
    }

    #[test]
    fn short_series_reports_insufficient_columns() {
        let frame = compute_indicators(&make_series(&[10.0; 30]), &IndicatorParams::default());
        let report = frame.insufficient();
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].indicator, IndicatorKind::LongMa);
        assert_eq!(report[0].required, 50);
        assert_eq!(report[0].available, 30);
        assert!(frame.rows().iter().all(|r| r.long_ma.is_none()));
    }

    #[test]
    fn rsi_needs_one_more_bar_than_its_window() {
        let frame = compute_indicators(
            &make_series(&[10.0, 11.0, 12.0]),
            &IndicatorParams::new(1, 2, 3),
        );
        let kinds: Vec<_> = frame.insufficient().iter().map(|d| d.indicator).collect();
        assert_eq!(kinds, vec![IndicatorKind::Rsi]);
    }
}
