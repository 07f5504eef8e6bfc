//! Pipeline — indicators, then signals, then backtest, over one series.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::backtest::{run_backtest, BacktestFrame, BacktestSummary};
use crate::domain::{PriceSeries, SeriesError};
use crate::indicators::{compute_indicators, IndicatorFrame, InsufficientData};
use crate::params::{ParamError, StrategyParams};
use crate::signal::{generate_signals, Signal};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] SeriesError),

    #[error("invalid parameters: {0}")]
    InvalidParams(#[from] ParamError),
}

/// Everything one pipeline run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutput {
    pub params: StrategyParams,
    pub insufficient: Vec<InsufficientData>,
    pub frame: BacktestFrame,
    pub summary: BacktestSummary,
}

impl PipelineOutput {
    pub fn latest_signal(&self) -> Signal {
        self.frame.last().map(|r| r.signal.signal).unwrap_or_default()
    }
}

/// Validate `params`, then run the three stages in order.
///
/// Deterministic: equal inputs give equal outputs.
pub fn run_pipeline(series: &PriceSeries, params: &StrategyParams) -> Result<PipelineOutput, PipelineError> {
    params.validate()?;

    let indicators = compute_indicators(series, &params.indicators);
    let insufficient = indicators.insufficient();
    for gap in &insufficient {
        tracing::warn!(symbol = series.symbol(), "{gap}");
    }

    let signals = generate_signals(&indicators, &params.signals);
    let (frame, summary) = run_backtest(&signals);

    Ok(PipelineOutput {
        params: *params,
        insufficient,
        frame,
        summary,
    })
}

/// Indicator stage only, with parameter validation. Used by the classifier.
pub fn indicator_frame(series: &PriceSeries, params: &StrategyParams) -> Result<IndicatorFrame, PipelineError> {
    params.indicators.validate()?;
    Ok(compute_indicators(series, &params.indicators))
}
