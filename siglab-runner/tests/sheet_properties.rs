//! Property tests for the exported views of a backtest.

use chrono::NaiveDate;
use proptest::prelude::*;

use siglab_core::data::DataSource;
use siglab_core::{IndicatorParams, PriceSeries, SignalParams, StrategyParams};
use siglab_runner::export::{export_backtest_csv, sheet_values, SheetColumn};
use siglab_runner::{run_from_series, BacktestReport};

const ALL_COLUMNS: [SheetColumn; 9] = [
    SheetColumn::Date,
    SheetColumn::Close,
    SheetColumn::ShortMa,
    SheetColumn::LongMa,
    SheetColumn::Rsi,
    SheetColumn::Signal,
    SheetColumn::Position,
    SheetColumn::DailyPnl,
    SheetColumn::CumulativePnl,
];

fn report(closes: &[f64]) -> BacktestReport {
    let base = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let series = PriceSeries::from_pairs(
        "PROP",
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| (base + chrono::Duration::days(i as i64), c)),
    )
    .unwrap();
    let params = StrategyParams {
        indicators: IndicatorParams::new(3, 8, 5),
        signals: SignalParams::default(),
    };
    run_from_series(&series, &params, DataSource::Csv).unwrap()
}

fn closes() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0f64..500.0, 1..80)
}

proptest! {
    #[test]
    fn sheet_is_header_plus_trailing_window(closes in closes(), rows in 1usize..40) {
        let report = report(&closes);
        let values = sheet_values(&report.frame, &ALL_COLUMNS, rows);

        prop_assert_eq!(values.len(), rows.min(closes.len()) + 1);
        prop_assert!(values.iter().all(|r| r.len() == ALL_COLUMNS.len()));

        let last = values.last().unwrap();
        let last_row = report.frame.last().unwrap();
        prop_assert_eq!(&last[0], &last_row.signal.indicators.date.to_string());
        prop_assert_eq!(&last[6], &last_row.position.to_string());
    }

    #[test]
    fn undefined_cells_are_empty(closes in closes()) {
        let report = report(&closes);
        let values = sheet_values(&report.frame, &ALL_COLUMNS, closes.len());
        for (row, cells) in report.frame.rows().iter().zip(values.iter().skip(1)) {
            let ind = &row.signal.indicators;
            prop_assert_eq!(cells[2].is_empty(), ind.short_ma.is_none());
            prop_assert_eq!(cells[3].is_empty(), ind.long_ma.is_none());
            prop_assert_eq!(cells[4].is_empty(), ind.rsi.is_none());
            prop_assert_eq!(cells[7].is_empty(), row.daily_pnl.is_none());
        }
    }

    #[test]
    fn csv_has_one_line_per_bar(closes in closes()) {
        let report = report(&closes);
        let csv = export_backtest_csv(&report.frame).unwrap();
        prop_assert_eq!(csv.lines().count(), closes.len() + 1);
    }
}
