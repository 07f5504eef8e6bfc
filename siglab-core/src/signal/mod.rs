//! Signal generation — turns indicator rows into Buy / Sell / Hold.
//!
//! Signals are position-agnostic: each row's decision reads only that row and
//! the row before it. Nothing about accumulated position or earlier history
//! feeds back in.

pub mod rules;

use serde::{Deserialize, Serialize};

use crate::indicators::{IndicatorFrame, IndicatorRow};
use crate::params::SignalParams;

pub use rules::{evaluate_row, is_golden_cross};

/// Discrete per-bar decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Buy,
    Sell,
    #[default]
    Hold,
}

impl Signal {
    /// Signed contribution to position: Buy +1, Sell -1, Hold 0.
    pub fn value(self) -> i64 {
        match self {
            Signal::Buy => 1,
            Signal::Sell => -1,
            Signal::Hold => 0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Signal::Buy => "BUY",
            Signal::Sell => "SELL",
            Signal::Hold => "HOLD",
        }
    }

    pub fn is_actionable(self) -> bool {
        self != Signal::Hold
    }
}

/// An indicator row with its decision attached.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalRow {
    #[serde(flatten)]
    pub indicators: IndicatorRow,
    pub signal: Signal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalFrame {
    pub symbol: String,
    pub params: SignalParams,
    rows: Vec<SignalRow>,
}

impl SignalFrame {
    pub fn from_rows(symbol: impl Into<String>, params: SignalParams, rows: Vec<SignalRow>) -> Self {
        Self {
            symbol: symbol.into(),
            params,
            rows,
        }
    }

    pub fn rows(&self) -> &[SignalRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Most recent decision, or `Hold` for an empty frame.
    pub fn latest_signal(&self) -> Signal {
        self.rows.last().map(|r| r.signal).unwrap_or_default()
    }

    pub fn count(&self, signal: Signal) -> usize {
        self.rows.iter().filter(|r| r.signal == signal).count()
    }
}

/// Apply the signal rules to every row of an indicator frame.
pub fn generate_signals(frame: &IndicatorFrame, params: &SignalParams) -> SignalFrame {
    let rows: Vec<SignalRow> = frame
        .rows()
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let prev = i.checked_sub(1).map(|p| &frame.rows()[p]);
            SignalRow {
                indicators: *row,
                signal: evaluate_row(prev, row, params),
            }
        })
        .collect();

    let out = SignalFrame::from_rows(frame.symbol.clone(), *params, rows);
    tracing::debug!(
        symbol = %out.symbol,
        buys = out.count(Signal::Buy),
        sells = out.count(Signal::Sell),
        "generated signals"
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{compute_indicators, make_series};
    use crate::params::IndicatorParams;

    #[test]
    fn signal_values() {
        assert_eq!(Signal::Buy.value(), 1);
        assert_eq!(Signal::Sell.value(), -1);
        assert_eq!(Signal::Hold.value(), 0);
        assert!(!Signal::Hold.is_actionable());
        assert_eq!(Signal::default(), Signal::Hold);
    }

    #[test]
    fn literal_scenario_signals() {
        let frame = compute_indicators(
            &make_series(&[10.0, 10.0, 12.0, 9.0, 15.0]),
            &IndicatorParams::new(2, 3, 2),
        );
        let signals = generate_signals(&frame, &SignalParams::default());
        let got: Vec<Signal> = signals.rows().iter().map(|r| r.signal).collect();
        // Index 2: RSI = 100 > 70 with every column defined → Sell.
        assert_eq!(
            got,
            vec![Signal::Hold, Signal::Hold, Signal::Sell, Signal::Hold, Signal::Hold]
        );
        assert_eq!(signals.latest_signal(), Signal::Hold);
        assert_eq!(signals.count(Signal::Sell), 1);
    }

    #[test]
    fn flattened_row_serialization() {
        let frame = compute_indicators(&make_series(&[10.0, 11.0]), &IndicatorParams::new(1, 2, 1));
        let signals = generate_signals(&frame, &SignalParams::default());
        let json = serde_json::to_value(signals.rows()[1]).unwrap();
        assert_eq!(json["close"], 11.0);
        assert_eq!(json["signal"], "sell");
        assert!(json.get("indicators").is_none());
    }
}
