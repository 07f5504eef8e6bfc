//! Crossover + RSI threshold rules.
//!
//! Buy: short MA crosses above long MA on this bar AND RSI < oversold.
//! Sell: RSI > overbought, regardless of the crossover.
//! Sell is applied last, so a row matching both rules is Sell.
//!
//! A row is only eligible for Buy or Sell when short MA, long MA and RSI are
//! all defined at that row; a missing column always yields Hold.

use super::Signal;
use crate::indicators::IndicatorRow;
use crate::params::SignalParams;

/// Golden cross between `prev` and `cur`: short ≤ long before, short > long now.
///
/// Returns false whenever any of the four MA values is undefined.
pub fn is_golden_cross(prev: &IndicatorRow, cur: &IndicatorRow) -> bool {
    match (prev.short_ma, prev.long_ma, cur.short_ma, cur.long_ma) {
        (Some(short_prev), Some(long_prev), Some(short_cur), Some(long_cur)) => {
            short_cur > long_cur && short_prev <= long_prev
        }
        _ => false,
    }
}

/// Decide the signal for `cur`, given the row before it (`None` at index 0).
pub fn evaluate_row(prev: Option<&IndicatorRow>, cur: &IndicatorRow, params: &SignalParams) -> Signal {
    let (Some(_), Some(_), Some(rsi)) = (cur.short_ma, cur.long_ma, cur.rsi) else {
        return Signal::Hold;
    };

    let mut signal = Signal::Hold;

    let crossed = prev.is_some_and(|p| is_golden_cross(p, cur));
    if crossed && rsi < params.rsi_oversold {
        signal = Signal::Buy;
    }

    // Unconditional and last: overrides a Buy on the same row.
    if rsi > params.rsi_overbought {
        signal = Signal::Sell;
    }

    signal
}
