//! CSV file provider.
//!
//! Reads any CSV with a `date` column (`%Y-%m-%d`) and a `close` column,
//! matched case-insensitively, so both a bare `date,close` file and a full
//! Date/Open/High/Low/Close/Volume download load unchanged. Extra columns are
//! ignored; rows with an empty close are skipped.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use super::provider::{DataError, DataProvider, DataSource, FetchResult};
use crate::domain::PriceBar;

pub struct CsvProvider {
    path: PathBuf,
}

impl CsvProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn csv_error(&self, message: impl Into<String>) -> DataError {
        DataError::Csv {
            path: self.path.display().to_string(),
            message: message.into(),
        }
    }

    /// Every bar in the file, in file order.
    pub fn read_all(&self) -> Result<Vec<PriceBar>, DataError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(|e| self.csv_error(e.to_string()))?;

        let headers = reader.headers().map_err(|e| self.csv_error(e.to_string()))?.clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name))
                .ok_or_else(|| self.csv_error(format!("missing '{name}' column")))
        };
        let date_col = column("date")?;
        let close_col = column("close")?;

        let mut bars = Vec::new();
        for (line, record) in reader.records().enumerate() {
            let record = record.map_err(|e| self.csv_error(e.to_string()))?;
            let row = line + 2;

            let raw_date = record.get(date_col).unwrap_or_default();
            // Accept timestamps like "2024-01-02 00:00:00+05:30" by keeping the date part.
            let date_part = raw_date.get(..10).unwrap_or(raw_date);
            let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
                .map_err(|e| self.csv_error(format!("row {row}: bad date '{raw_date}': {e}")))?;

            let raw_close = record.get(close_col).unwrap_or_default();
            if raw_close.is_empty() {
                continue;
            }
            let close: f64 = raw_close
                .parse()
                .map_err(|e| self.csv_error(format!("row {row}: bad close '{raw_close}': {e}")))?;

            bars.push(PriceBar::new(date, close));
        }
        Ok(bars)
    }
}

impl DataProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv"
    }

    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<FetchResult, DataError> {
        let bars: Vec<PriceBar> = self
            .read_all()?
            .into_iter()
            .filter(|b| b.date >= start && b.date <= end)
            .collect();
        tracing::info!(symbol, bars = bars.len(), path = %self.path.display(), "loaded CSV");
        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars,
            source: DataSource::Csv,
        })
    }
}
