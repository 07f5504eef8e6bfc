//! Strategy parameters: indicator windows and RSI thresholds.
//!
//! Defaults reproduce the classic 20/50 MA pair with a 14-bar RSI and 30/70
//! bands. Every value is configurable so tests can shrink the windows.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Invalid strategy parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    #[error("{name} must be >= 1, got {value}")]
    ZeroWindow { name: &'static str, value: usize },

    #[error("short_window ({short}) must be less than long_window ({long})")]
    WindowOrder { short: usize, long: usize },

    #[error("RSI thresholds must lie within [0, 100], got oversold {oversold}, overbought {overbought}")]
    RsiThresholds { oversold: f64, overbought: f64 },
}

/// Window lengths for the indicator engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorParams {
    pub short_window: usize,
    pub long_window: usize,
    pub rsi_window: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            short_window: 20,
            long_window: 50,
            rsi_window: 14,
        }
    }
}

impl IndicatorParams {
    pub fn new(short_window: usize, long_window: usize, rsi_window: usize) -> Self {
        Self {
            short_window,
            long_window,
            rsi_window,
        }
    }

    pub fn validate(&self) -> Result<(), ParamError> {
        for (name, value) in [
            ("short_window", self.short_window),
            ("long_window", self.long_window),
            ("rsi_window", self.rsi_window),
        ] {
            if value == 0 {
                return Err(ParamError::ZeroWindow { name, value });
            }
        }
        if self.short_window >= self.long_window {
            return Err(ParamError::WindowOrder {
                short: self.short_window,
                long: self.long_window,
            });
        }
        Ok(())
    }

    /// Bars needed before every indicator can be defined.
    pub fn max_lookback(&self) -> usize {
        (self.long_window - 1).max(self.rsi_window)
    }
}

/// RSI bands used by the signal rules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalParams {
    /// Buy requires RSI strictly below this level.
    pub rsi_oversold: f64,
    /// Sell fires when RSI is strictly above this level.
    pub rsi_overbought: f64,
}

impl Default for SignalParams {
    fn default() -> Self {
        Self {
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
        }
    }
}

impl SignalParams {
    /// Bands may cross (oversold above overbought); rows matching both rules
    /// then resolve to Sell.
    pub fn validate(&self) -> Result<(), ParamError> {
        let in_range = |v: f64| (0.0..=100.0).contains(&v);
        if !in_range(self.rsi_oversold) || !in_range(self.rsi_overbought) {
            return Err(ParamError::RsiThresholds {
                oversold: self.rsi_oversold,
                overbought: self.rsi_overbought,
            });
        }
        Ok(())
    }
}

/// Everything the pipeline needs besides the price series.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyParams {
    pub indicators: IndicatorParams,
    pub signals: SignalParams,
}

impl StrategyParams {
    pub fn validate(&self) -> Result<(), ParamError> {
        self.indicators.validate()?;
        self.signals.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let p = StrategyParams::default();
        assert_eq!(p.indicators, IndicatorParams::new(20, 50, 14));
        assert_eq!(p.signals.rsi_oversold, 30.0);
        assert_eq!(p.signals.rsi_overbought, 70.0);
        assert!(p.validate().is_ok());
        assert_eq!(p.indicators.max_lookback(), 49);
    }

    #[test]
    fn rejects_zero_window() {
        let err = IndicatorParams::new(0, 50, 14).validate().unwrap_err();
        assert_eq!(err, ParamError::ZeroWindow { name: "short_window", value: 0 });
        assert!(IndicatorParams::new(2, 3, 0).validate().is_err());
    }

    #[test]
    fn rejects_inverted_windows() {
        let err = IndicatorParams::new(50, 20, 14).validate().unwrap_err();
        assert_eq!(err, ParamError::WindowOrder { short: 50, long: 20 });
        assert!(IndicatorParams::new(20, 20, 14).validate().is_err());
    }

    #[test]
    fn rsi_bands_must_be_in_range() {
        let crossed = SignalParams {
            rsi_oversold: 80.0,
            rsi_overbought: 20.0,
        };
        assert!(crossed.validate().is_ok());
        let p = SignalParams {
            rsi_oversold: f64::NAN,
            rsi_overbought: 70.0,
        };
        assert!(p.validate().is_err());
        let p = SignalParams {
            rsi_oversold: 30.0,
            rsi_overbought: 120.0,
        };
        assert!(p.validate().is_err());
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let p: StrategyParams =
            serde_json::from_str(r#"{"indicators":{"short_window":5,"long_window":10}}"#).unwrap();
        assert_eq!(p.indicators.short_window, 5);
        assert_eq!(p.indicators.rsi_window, 14);
        assert_eq!(p.signals, SignalParams::default());
    }
}
