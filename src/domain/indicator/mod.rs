//! Technical indicator implementations.
//!
//! Every indicator maps a close series to a series of the same length where
//! `None` marks bars inside the warm-up period. Undefined values are never
//! coerced to zero.

pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;

pub use ema::calculate_ema;
pub use macd::{calculate_macd, MacdSeries};
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
}

impl IndicatorType {
    /// Number of leading bars for which the indicator is undefined.
    pub fn warmup(&self) -> usize {
        match self {
            IndicatorType::Sma(window) => window.saturating_sub(1),
            IndicatorType::Ema(_) | IndicatorType::Macd { .. } => 0,
            IndicatorType::Rsi(period) => *period,
        }
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
        }
    }
}

/// Element-wise `a - b`, undefined where either side is undefined.
pub(crate) fn subtract(a: &[Option<f64>], b: &[Option<f64>]) -> Vec<Option<f64>> {
    a.iter()
        .zip(b)
        .map(|(x, y)| Some((*x)? - (*y)?))
        .collect()
}
