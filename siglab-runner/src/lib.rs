//! Siglab Runner — configuration, data loading, backtest reports and the
//! delivery side of the signal pipeline.
//!
//! This crate builds on `siglab-core` to provide:
//! - TOML configuration with environment overrides for secrets
//! - Provider selection and dataset fingerprinting
//! - Backtest reports with deterministic run ids
//! - JSON/CSV/Markdown artifacts and spreadsheet export
//! - Telegram alerts and the scheduled monitor loop
//! - A random-forest next-move classifier

pub mod alert;
pub mod classifier;
pub mod config;
pub mod data_loader;
pub mod export;
pub mod logging;
pub mod runner;

pub use alert::{
    alert_message, stop_on_ctrl_c, AlertChannel, AlertError, CheckOutcome, Monitor, MonitorStats, TelegramChannel,
};
pub use classifier::{train_classifier, ClassifierError, RandomForest, TrainingReport};
pub use config::{
    AlertConfig, ClassifierConfig, ConfigError, DataConfig, ExportConfig, SiglabConfig, StrategyConfig,
};
pub use data_loader::{compute_dataset_hash, load_series, provider_for, LoadError, LoadedSeries};
pub use export::{
    export_backtest_csv, export_json, generate_report, import_json, load_artifacts, save_artifacts, sheet_values,
    write_sheet, CsvSheetSink, SheetColumn, SheetSink,
};
pub use logging::{init_file_tracing, init_tracing};
pub use runner::{compute_run_id, run_backtest, run_from_series, BacktestReport, RunError, SCHEMA_VERSION};
