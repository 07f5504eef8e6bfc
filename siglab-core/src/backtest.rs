//! Backtest engine — position accumulation and profit-and-loss.
//!
//! Position(t) is the running sum of signals and is never clamped: three Buys
//! in a row hold +3 units. Daily PnL marks the position carried *into* bar t
//! against that bar's price change, so the first bar has no PnL.

use serde::{Deserialize, Serialize};

use crate::signal::{SignalFrame, SignalRow};

/// A signal row with position and PnL attached.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BacktestRow {
    #[serde(flatten)]
    pub signal: SignalRow,
    pub position: i64,
    /// `None` at index 0.
    pub daily_pnl: Option<f64>,
    pub cumulative_pnl: f64,
}

impl BacktestRow {
    pub fn close(&self) -> f64 {
        self.signal.indicators.close
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestFrame {
    pub symbol: String,
    rows: Vec<BacktestRow>,
}

impl BacktestFrame {
    pub fn rows(&self) -> &[BacktestRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn last(&self) -> Option<&BacktestRow> {
        self.rows.last()
    }

    /// The trailing `n` rows (all rows if the frame is shorter).
    pub fn tail(&self, n: usize) -> &[BacktestRow] {
        &self.rows[self.rows.len().saturating_sub(n)..]
    }
}

/// Aggregate statistics over a backtest frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BacktestSummary {
    /// Bars t >= 1 that started with a non-zero position.
    pub trade_count: usize,
    /// Percentage (0-100) of valid trades with strictly positive PnL.
    pub win_rate: f64,
    pub total_pnl: f64,
    /// No valid trades: `win_rate` is reported as 0 and carries no meaning.
    pub degenerate: bool,
}

impl BacktestSummary {
    pub fn from_rows(rows: &[BacktestRow]) -> Self {
        let mut trade_count = 0usize;
        let mut wins = 0usize;

        for pair in rows.windows(2) {
            if pair[0].position == 0 {
                continue;
            }
            trade_count += 1;
            if pair[1].daily_pnl.is_some_and(|pnl| pnl > 0.0) {
                wins += 1;
            }
        }

        let degenerate = trade_count == 0;
        let win_rate = if degenerate {
            0.0
        } else {
            100.0 * wins as f64 / trade_count as f64
        };

        Self {
            trade_count,
            win_rate,
            total_pnl: rows.last().map_or(0.0, |r| r.cumulative_pnl),
            degenerate,
        }
    }
}

/// Walk a signal frame once, accumulating position and PnL.
pub fn run_backtest(signals: &SignalFrame) -> (BacktestFrame, BacktestSummary) {
    let mut rows = Vec::with_capacity(signals.len());
    let mut position = 0i64;
    let mut cumulative = 0.0f64;
    let mut prev: Option<(f64, i64)> = None;

    for sig in signals.rows() {
        let close = sig.indicators.close;
        let daily_pnl = prev.map(|(prev_close, prev_position)| (close - prev_close) * prev_position as f64);

        position += sig.signal.value();
        cumulative += daily_pnl.unwrap_or(0.0);

        rows.push(BacktestRow {
            signal: *sig,
            position,
            daily_pnl,
            cumulative_pnl: cumulative,
        });
        prev = Some((close, position));
    }

    let summary = BacktestSummary::from_rows(&rows);
    tracing::debug!(
        symbol = %signals.symbol,
        trades = summary.trade_count,
        win_rate = summary.win_rate,
        total_pnl = summary.total_pnl,
        "backtest complete"
    );

    let frame = BacktestFrame {
        symbol: signals.symbol.clone(),
        rows,
    };
    (frame, summary)
}
