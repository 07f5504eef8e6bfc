//! Test helpers for building reports without I/O.

use chrono::NaiveDate;
use siglab_core::data::{DataProvider, DataSource, SyntheticProvider};
use siglab_core::{IndicatorParams, PriceSeries, SignalParams, StrategyParams};
use siglab_runner::{run_from_series, BacktestReport};

/// Closes [10, 10, 12, 9, 15] with windows 2/3/2: a SELL at bar 2.
pub fn small_report() -> BacktestReport {
    let base = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let series = PriceSeries::from_pairs(
        "TEST",
        [10.0, 10.0, 12.0, 9.0, 15.0]
            .into_iter()
            .enumerate()
            .map(|(i, c)| (base + chrono::Duration::days(i as i64), c)),
    )
    .unwrap();
    let params = StrategyParams {
        indicators: IndicatorParams::new(2, 3, 2),
        signals: SignalParams::default(),
    };
    run_from_series(&series, &params, DataSource::Csv).unwrap()
}

/// Six months of the seeded random walk with default windows.
pub fn synthetic_report() -> BacktestReport {
    let series = SyntheticProvider::new(42)
        .fetch_series(
            "SYN",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 28).unwrap(),
        )
        .unwrap();
    run_from_series(&series, &StrategyParams::default(), DataSource::Synthetic).unwrap()
}

/// Flatten a rendered buffer into one string.
pub fn buffer_text(buf: &ratatui::buffer::Buffer) -> String {
    let area = buf.area;
    let mut content = String::new();
    for y in area.y..area.bottom() {
        for x in area.x..area.right() {
            content.push_str(buf.cell((x, y)).map_or(" ", |c| c.symbol()));
        }
        content.push('\n');
    }
    content
}
