// =============================================================================
// MACD (12, 26, 9)
// =============================================================================
//
// MACD line   = EMA(12, close) - EMA(26, close)
// Signal line = EMA(9) of the MACD line itself (not of price)
//
// With SMA-seeded EMAs the MACD line is defined from index 25 and the signal
// line from index 33.
// =============================================================================

use super::ema::{calculate_ema, calculate_ema_of_defined};

pub const FAST_SPAN: usize = 12;
pub const SLOW_SPAN: usize = 26;
pub const SIGNAL_SPAN: usize = 9;

/// Full-length MACD and signal series.
#[derive(Debug, Clone)]
pub struct MacdSeries {
    pub macd: Vec<Option<f64>>,
    pub signal: Vec<Option<f64>>,
}

/// Compute MACD and its signal line for `closes`.  Both output vectors have
/// `closes.len()` points.
pub fn calculate_macd(closes: &[f64]) -> MacdSeries {
    let fast = calculate_ema(closes, FAST_SPAN);
    let slow = calculate_ema(closes, SLOW_SPAN);

    let macd: Vec<Option<f64>> = fast
        .iter()
        .zip(slow.iter())
        .map(|(f, s)| match (f, s) {
            (Some(f), Some(s)) => Some(f - s),
            _ => None,
        })
        .collect();

    let signal = calculate_ema_of_defined(&macd, SIGNAL_SPAN);

    MacdSeries { macd, signal }
}
