//! Flat export — JSON report, per-bar CSV, Markdown summary, sheet log.
//!
//! All persisted reports include a `schema_version` field. Unknown versions
//! are rejected on load. Undefined values (`None`) are written as empty
//! cells everywhere.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use siglab_core::{BacktestFrame, BacktestRow};

use crate::runner::{BacktestReport, SCHEMA_VERSION};

fn opt_cell(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.6}")).unwrap_or_default()
}

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a report to pretty JSON.
pub fn export_json(report: &BacktestReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize BacktestReport to JSON")
}

/// Deserialize a report, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<BacktestReport> {
    let report: BacktestReport =
        serde_json::from_str(json).context("failed to deserialize BacktestReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// One row per bar.
///
/// Columns: date, close, short_ma, long_ma, rsi, signal, position,
/// daily_pnl, cumulative_pnl
pub fn export_backtest_csv(frame: &BacktestFrame) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "date",
        "close",
        "short_ma",
        "long_ma",
        "rsi",
        "signal",
        "position",
        "daily_pnl",
        "cumulative_pnl",
    ])?;

    for row in frame.rows() {
        let ind = &row.signal.indicators;
        wtr.write_record([
            ind.date.to_string(),
            format!("{:.6}", ind.close),
            opt_cell(ind.short_ma),
            opt_cell(ind.long_ma),
            opt_cell(ind.rsi),
            row.signal.signal.label().to_string(),
            row.position.to_string(),
            opt_cell(row.daily_pnl),
            format!("{:.6}", row.cumulative_pnl),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Markdown report ────────────────────────────────────────────────

/// Human-readable summary of one run.
pub fn generate_report(report: &BacktestReport) -> String {
    let mut md = String::with_capacity(1024);
    let p = &report.params;
    let s = &report.summary;

    md.push_str("# Backtest Report\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Symbol | {} |\n", report.symbol));
    md.push_str(&format!("| Source | {} |\n", report.source.label()));
    md.push_str(&format!("| Period | {} to {} |\n", report.start_date, report.end_date));
    md.push_str(&format!("| Bars | {} |\n", report.bar_count()));
    md.push_str(&format!(
        "| MA windows | {} / {} |\n",
        p.indicators.short_window, p.indicators.long_window
    ));
    md.push_str(&format!(
        "| RSI | {} bars, bands {} / {} |\n",
        p.indicators.rsi_window, p.signals.rsi_oversold, p.signals.rsi_overbought
    ));
    md.push_str(&format!("| Dataset Hash | {} |\n", report.dataset_hash));
    md.push_str(&format!("| Run ID | {} |\n\n", report.run_id));

    md.push_str("## Summary\n\n");
    md.push_str(&format!("- Trades: {}\n", s.trade_count));
    if s.degenerate {
        md.push_str("- Win rate: n/a (no trades)\n");
    } else {
        md.push_str(&format!("- Win rate: {:.1}%\n", s.win_rate));
    }
    md.push_str(&format!("- Total PnL: {:.2}\n", s.total_pnl));
    md.push_str(&format!("- Latest signal: {}\n", report.latest_signal().label()));

    if !report.insufficient.is_empty() {
        md.push_str("\n## Data Warnings\n\n");
        for gap in &report.insufficient {
            md.push_str(&format!("- {gap}\n"));
        }
    }
    md
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the artifact set for one run.
///
/// Creates `{symbol}_{timestamp}/` under `output_dir` containing:
/// - `report.json`: the full `BacktestReport`
/// - `backtest.csv`: one row per bar
/// - `report.md`: Markdown summary
///
/// Returns the path to the created directory.
pub fn save_artifacts(report: &BacktestReport, output_dir: &Path) -> Result<PathBuf> {
    let dirname = format!(
        "{}_{}",
        report.symbol.replace(['/', '\\'], "_"),
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    );
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    std::fs::write(run_dir.join("report.json"), export_json(report)?)?;
    std::fs::write(run_dir.join("backtest.csv"), export_backtest_csv(&report.frame)?)?;
    std::fs::write(run_dir.join("report.md"), generate_report(report))?;

    tracing::info!(dir = %run_dir.display(), "artifacts saved");
    Ok(run_dir)
}

/// Load a report from an artifact directory's report.json.
pub fn load_artifacts(dir: &Path) -> Result<BacktestReport> {
    let path = dir.join("report.json");
    let json = std::fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}

// ─── Sheet log ──────────────────────────────────────────────────────

/// A column of the spreadsheet-style log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetColumn {
    Date,
    Close,
    ShortMa,
    LongMa,
    Rsi,
    Signal,
    Position,
    DailyPnl,
    CumulativePnl,
}

impl SheetColumn {
    pub const DEFAULT: [SheetColumn; 3] = [SheetColumn::Close, SheetColumn::Signal, SheetColumn::CumulativePnl];

    pub fn header(&self) -> &'static str {
        match self {
            SheetColumn::Date => "Date",
            SheetColumn::Close => "Close",
            SheetColumn::ShortMa => "Short_MA",
            SheetColumn::LongMa => "Long_MA",
            SheetColumn::Rsi => "RSI",
            SheetColumn::Signal => "Signal",
            SheetColumn::Position => "Position",
            SheetColumn::DailyPnl => "Daily_PnL",
            SheetColumn::CumulativePnl => "Cumulative_PnL",
        }
    }

    /// Cell text for `row`; undefined values are empty.
    pub fn cell(&self, row: &BacktestRow) -> String {
        let ind = &row.signal.indicators;
        let num = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_default();
        match self {
            SheetColumn::Date => ind.date.to_string(),
            SheetColumn::Close => ind.close.to_string(),
            SheetColumn::ShortMa => num(ind.short_ma),
            SheetColumn::LongMa => num(ind.long_ma),
            SheetColumn::Rsi => num(ind.rsi),
            SheetColumn::Signal => row.signal.signal.value().to_string(),
            SheetColumn::Position => row.position.to_string(),
            SheetColumn::DailyPnl => num(row.daily_pnl),
            SheetColumn::CumulativePnl => row.cumulative_pnl.to_string(),
        }
    }
}

/// Header row plus the trailing `rows` rows of `frame`.
pub fn sheet_values(frame: &BacktestFrame, columns: &[SheetColumn], rows: usize) -> Vec<Vec<String>> {
    let mut values = Vec::with_capacity(rows + 1);
    values.push(columns.iter().map(|c| c.header().to_string()).collect());
    for row in frame.tail(rows) {
        values.push(columns.iter().map(|c| c.cell(row)).collect());
    }
    values
}

/// Destination for the sheet log. Each write replaces the previous contents
/// entirely, starting at the top-left cell.
pub trait SheetSink {
    fn replace(&mut self, values: &[Vec<String>]) -> Result<()>;
}

/// Writes the sheet to a local CSV file, truncating it first.
pub struct CsvSheetSink {
    path: PathBuf,
}

impl CsvSheetSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SheetSink for CsvSheetSink {
    fn replace(&mut self, values: &[Vec<String>]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let mut wtr = csv::WriterBuilder::new()
            .flexible(true)
            .from_path(&self.path)
            .with_context(|| format!("failed to open {}", self.path.display()))?;
        for record in values {
            wtr.write_record(record)?;
        }
        wtr.flush().context("failed to flush sheet CSV")?;
        tracing::info!(path = %self.path.display(), rows = values.len().saturating_sub(1), "sheet written");
        Ok(())
    }
}

/// Build the trailing window and hand it to `sink`.
pub fn write_sheet(
    sink: &mut dyn SheetSink,
    frame: &BacktestFrame,
    columns: &[SheetColumn],
    rows: usize,
) -> Result<()> {
    sink.replace(&sheet_values(frame, columns, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::run_from_series;
    use chrono::NaiveDate;
    use siglab_core::data::DataSource;
    use siglab_core::{IndicatorParams, PriceSeries, SignalParams, StrategyParams};

    fn report() -> BacktestReport {
        let base = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let series = PriceSeries::from_pairs(
            "EXP",
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
        run_from_series(&series, &params, DataSource::Synthetic).unwrap()
    }

    #[test]
    fn csv_has_one_row_per_bar_with_empty_undefined_cells() {
        let csv = export_backtest_csv(&report().frame).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(
            lines[0],
            "date,close,short_ma,long_ma,rsi,signal,position,daily_pnl,cumulative_pnl"
        );
        assert_eq!(lines[1], "2024-01-02,10.000000,,,,HOLD,0,,0.000000");
        assert!(lines[3].contains("SELL,-1"));
    }

    #[test]
    fn json_roundtrip_and_version_gate() {
        let r = report();
        let json = export_json(&r).unwrap();
        assert_eq!(import_json(&json).unwrap(), r);

        let future = json.replacen(
            &format!("\"schema_version\": {SCHEMA_VERSION}"),
            "\"schema_version\": 99",
            1,
        );
        assert!(import_json(&future).is_err());
    }

    #[test]
    fn sheet_window_has_header_and_trailing_rows() {
        let values = sheet_values(&report().frame, &SheetColumn::DEFAULT, 2);
        assert_eq!(values.len(), 3);
        assert_eq!(values[0], vec!["Close", "Signal", "Cumulative_PnL"]);
        assert_eq!(values[1], vec!["9", "0", "3"]);
        assert_eq!(values[2], vec!["15", "0", "-3"]);
    }

    #[test]
    fn sheet_leaves_undefined_cells_empty() {
        let values = sheet_values(&report().frame, &[SheetColumn::Date, SheetColumn::Rsi], 10);
        assert_eq!(values.len(), 6);
        assert_eq!(values[1], vec!["2024-01-02", ""]);
        assert_eq!(values[3][1], "100");
    }

    #[test]
    fn csv_sink_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("sheet.csv");
        let mut sink = CsvSheetSink::new(&path);
        let frame = report().frame;

        write_sheet(&mut sink, &frame, &SheetColumn::DEFAULT, 5).unwrap();
        write_sheet(&mut sink, &frame, &SheetColumn::DEFAULT, 1).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "Close,Signal,Cumulative_PnL\n15,0,-3\n");
    }

    #[test]
    fn artifacts_bundle_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let r = report();
        let run_dir = save_artifacts(&r, dir.path()).unwrap();
        assert!(run_dir.file_name().unwrap().to_string_lossy().starts_with("EXP_"));
        assert!(run_dir.join("backtest.csv").exists());
        let md = std::fs::read_to_string(run_dir.join("report.md")).unwrap();
        assert!(md.contains("Win rate: 50.0%"));
        assert_eq!(load_artifacts(&run_dir).unwrap(), r);
    }
}
