//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line
//! Histogram = MACD Line - Signal Line
//!
//! Default parameters: fast=12, slow=26, signal=9.
//! Each output is undefined wherever one of its inputs is undefined.

use crate::domain::indicator::ema::{calculate_ema, calculate_ema_partial};
use crate::domain::indicator::subtract;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub line: Vec<Option<f64>>,
    pub signal: Vec<Option<f64>>,
    pub histogram: Vec<Option<f64>>,
}

pub fn calculate_macd(
    series: &[f64],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> MacdSeries {
    let ema_fast = calculate_ema(series, fast);
    let ema_slow = calculate_ema(series, slow);

    let line = subtract(&ema_fast, &ema_slow);
    let signal = calculate_ema_partial(&line, signal_period);
    let histogram = subtract(&line, &signal);

    MacdSeries {
        line,
        signal,
        histogram,
    }
}

pub fn calculate_macd_default(series: &[f64]) -> MacdSeries {
    calculate_macd(series, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
}
