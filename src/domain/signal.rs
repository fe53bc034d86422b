//! Rule-based signal generation.
//!
//! A bar is a buy when the RSI is oversold (< 30) while the short moving
//! average sits above the long one. The rule is evaluated per bar with no
//! memory of earlier signals.

use crate::domain::indicator::macd::{DEFAULT_FAST, DEFAULT_SIGNAL, DEFAULT_SLOW};
use crate::domain::indicator::{
    calculate_macd, calculate_rsi, calculate_sma, subtract, IndicatorType,
};
use crate::domain::ohlcv::{closes, Bar};
use log::debug;

pub const RSI_OVERSOLD: f64 = 30.0;

#[derive(Debug, Clone, PartialEq)]
pub struct SignalParams {
    pub rsi_period: usize,
    pub short_window: usize,
    pub long_window: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
}

impl Default for SignalParams {
    fn default() -> Self {
        SignalParams {
            rsi_period: 14,
            short_window: 20,
            long_window: 50,
            macd_fast: DEFAULT_FAST,
            macd_slow: DEFAULT_SLOW,
            macd_signal: DEFAULT_SIGNAL,
        }
    }
}

impl SignalParams {
    pub fn indicators(&self) -> Vec<IndicatorType> {
        vec![
            IndicatorType::Rsi(self.rsi_period),
            IndicatorType::Sma(self.short_window),
            IndicatorType::Sma(self.long_window),
            IndicatorType::Macd {
                fast: self.macd_fast,
                slow: self.macd_slow,
                signal: self.macd_signal,
            },
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Hold,
    Buy,
}

impl Signal {
    pub fn as_int(self) -> u8 {
        match self {
            Signal::Hold => 0,
            Signal::Buy => 1,
        }
    }
}

/// Per-bar indicator values. `None` is an undefined (warm-up) value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorSet {
    pub rsi: Option<f64>,
    pub sma_short: Option<f64>,
    pub sma_long: Option<f64>,
    pub ma_diff: Option<f64>,
    pub ma_diff_prev: Option<f64>,
    pub macd_line: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_histogram: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignaledBar {
    pub bar: Bar,
    pub indicators: IndicatorSet,
    pub signal: Signal,
}

/// Buy iff RSI < 30 and the short MA is above the long MA.
pub fn evaluate_rule(indicators: &IndicatorSet) -> Signal {
    match (indicators.rsi, indicators.ma_diff) {
        (Some(rsi), Some(diff)) if rsi < RSI_OVERSOLD && diff > 0.0 => Signal::Buy,
        _ => Signal::Hold,
    }
}

pub fn generate_signals(bars: &[Bar], params: &SignalParams) -> Vec<SignaledBar> {
    let close = closes(bars);

    let rsi = calculate_rsi(&close, params.rsi_period);
    let sma_short = calculate_sma(&close, params.short_window);
    let sma_long = calculate_sma(&close, params.long_window);
    let ma_diff = subtract(&sma_short, &sma_long);
    let macd = calculate_macd(
        &close,
        params.macd_fast,
        params.macd_slow,
        params.macd_signal,
    );

    let signaled: Vec<SignaledBar> = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let indicators = IndicatorSet {
                rsi: rsi[i],
                sma_short: sma_short[i],
                sma_long: sma_long[i],
                ma_diff: ma_diff[i],
                ma_diff_prev: if i > 0 { ma_diff[i - 1] } else { None },
                macd_line: macd.line[i],
                macd_signal: macd.signal[i],
                macd_histogram: macd.histogram[i],
            };
            let signal = evaluate_rule(&indicators);
            SignaledBar {
                bar: bar.clone(),
                indicators,
                signal,
            }
        })
        .collect();

    debug!(
        "computed {} over {} bars, {} buy signals",
        params
            .indicators()
            .iter()
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join(", "),
        bars.len(),
        count_buy_signals(&signaled)
    );

    signaled
}

pub fn count_buy_signals(signaled: &[SignaledBar]) -> usize {
    signaled.iter().filter(|s| s.signal == Signal::Buy).count()
}
