//! Backtest runner — loads a series, runs the pipeline, packages a report.
//!
//! Two entry points:
//! - `run_backtest()`: fetches through a provider. Used by the CLI and TUI.
//! - `run_from_series()`: takes an already-loaded series. No I/O.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use siglab_core::data::{DataProvider, DataSource};
use siglab_core::{
    run_pipeline, BacktestFrame, BacktestSummary, InsufficientData, PipelineError, PriceSeries, Signal,
    StrategyParams,
};

use crate::config::{ConfigError, SiglabConfig};
use crate::data_loader::{compute_dataset_hash, load_series, LoadError};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
}

/// Current schema version for persisted reports.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of one backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    /// Hash of parameters and dataset: equal inputs share a run id.
    pub run_id: String,
    pub symbol: String,
    pub source: DataSource,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub params: StrategyParams,
    pub dataset_hash: String,
    pub summary: BacktestSummary,
    pub insufficient: Vec<InsufficientData>,
    pub frame: BacktestFrame,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl BacktestReport {
    pub fn latest_signal(&self) -> Signal {
        self.frame.last().map(|r| r.signal.signal).unwrap_or_default()
    }

    pub fn bar_count(&self) -> usize {
        self.frame.len()
    }
}

/// Deterministic run id over parameters and dataset hash.
pub fn compute_run_id(params: &StrategyParams, dataset_hash: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    let ind = &params.indicators;
    for w in [ind.short_window, ind.long_window, ind.rsi_window] {
        hasher.update(&(w as u64).to_le_bytes());
    }
    hasher.update(&params.signals.rsi_oversold.to_le_bytes());
    hasher.update(&params.signals.rsi_overbought.to_le_bytes());
    hasher.update(dataset_hash.as_bytes());
    hasher.finalize().to_hex().to_string()
}

/// Run the pipeline over an already-loaded series.
pub fn run_from_series(
    series: &PriceSeries,
    params: &StrategyParams,
    source: DataSource,
) -> Result<BacktestReport, RunError> {
    let output = run_pipeline(series, params)?;
    let dataset_hash = compute_dataset_hash(series);

    Ok(BacktestReport {
        schema_version: SCHEMA_VERSION,
        run_id: compute_run_id(params, &dataset_hash),
        symbol: series.symbol().to_string(),
        source,
        start_date: series.first_date(),
        end_date: series.last_date(),
        params: *params,
        dataset_hash,
        summary: output.summary,
        insufficient: output.insufficient,
        frame: output.frame,
    })
}

/// Load the configured symbol and period ending at `end`, then run.
pub fn run_backtest(
    config: &SiglabConfig,
    provider: &dyn DataProvider,
    end: NaiveDate,
) -> Result<BacktestReport, RunError> {
    config.validate()?;
    let loaded = load_series(
        provider,
        config.data.source,
        &config.data.symbol,
        config.data.period,
        end,
    )?;
    let report = run_from_series(&loaded.series, &config.strategy.params(), loaded.source)?;
    tracing::info!(
        symbol = %report.symbol,
        run_id = %&report.run_id[..12],
        trades = report.summary.trade_count,
        total_pnl = report.summary.total_pnl,
        "backtest finished"
    );
    Ok(report)
}
