//! Siglab Core — price series, indicators, signal rules, backtest arithmetic.
//!
//! This crate contains the signal pipeline and everything it needs:
//! - Validated price series (`PriceSeries`)
//! - Indicator engine (short/long SMA, RSI) with explicit warm-up
//! - Crossover + RSI signal rules
//! - Position and PnL accumulation with summary statistics
//! - Classifier feature extraction
//! - Data providers (Yahoo Finance, CSV file, synthetic)
//!
//! Everything outside `data` is pure and synchronous.

pub mod backtest;
pub mod data;
pub mod domain;
pub mod features;
pub mod indicators;
pub mod params;
pub mod pipeline;
pub mod signal;

pub use backtest::{run_backtest, BacktestFrame, BacktestRow, BacktestSummary};
pub use domain::{PriceBar, PriceSeries, SeriesError};
pub use indicators::{compute_indicators, IndicatorFrame, IndicatorRow, InsufficientData};
pub use params::{IndicatorParams, ParamError, SignalParams, StrategyParams};
pub use pipeline::{run_pipeline, PipelineError, PipelineOutput};
pub use signal::{generate_signals, Signal, SignalFrame, SignalRow};
