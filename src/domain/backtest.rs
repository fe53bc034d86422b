//! Single-position backtest simulator.
//!
//! Replays signaled bars in order. A buy signal while flat opens a position
//! with the whole capital at the bar's close; the entry bar is not checked for
//! exits. While in a position each later bar exits on a trend reversal (the
//! MA spread turning negative), an overbought RSI, or the end of the data.

use chrono::NaiveDate;
use log::debug;

use super::metrics::Summary;
use super::position::{ExitReason, Position, Trade};
use super::signal::{IndicatorSet, Signal, SignaledBar};

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    pub rsi_exit: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_capital: 100_000.0,
            rsi_exit: 70.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub trades: Vec<Trade>,
    pub summary: Summary,
}

/// The first exit trigger that fires on this bar, if any.
fn exit_reason(indicators: &IndicatorSet, rsi_exit: f64, is_last: bool) -> Option<ExitReason> {
    let cross_down = matches!(
        (indicators.ma_diff_prev, indicators.ma_diff),
        (Some(prev), Some(cur)) if prev >= 0.0 && cur < 0.0
    );
    let overbought = indicators.rsi.is_some_and(|rsi| rsi > rsi_exit);

    if cross_down {
        Some(ExitReason::TrendReversal)
    } else if overbought {
        Some(ExitReason::Overbought)
    } else if is_last {
        Some(ExitReason::EndOfData)
    } else {
        None
    }
}

pub fn run_backtest(signaled: &[SignaledBar], config: &BacktestConfig) -> BacktestResult {
    let mut trades: Vec<Trade> = Vec::new();
    let mut position: Option<Position> = None;
    let mut capital = config.initial_capital;
    let last_index = signaled.len().saturating_sub(1);

    for (i, sb) in signaled.iter().enumerate() {
        let price = sb.bar.close;
        let date: NaiveDate = sb.bar.date;

        if position.is_none() {
            if sb.signal == Signal::Buy {
                debug!("Entering position on {} at {:.2}", date, price);
                position = Some(Position::open(date, price, capital));
            }
            continue;
        }

        let Some(reason) = exit_reason(&sb.indicators, config.rsi_exit, i == last_index) else {
            continue;
        };
        if let Some(open) = position.take() {
            let trade = open.close(date, price, reason);
            capital += trade.pnl;
            debug!(
                "Exiting position on {} at {:.2} after {} days (pnl {:.2}, {:.2}%, {})",
                date,
                price,
                trade.holding_days(),
                trade.pnl,
                trade.pnl_pct_points(),
                reason
            );
            trades.push(trade);
        }
    }

    if let Some(open) = position.take() {
        // only reachable when the entry happened on the final bar
        debug!(
            "Discarding entry on {} at {:.2}: no bar left to exit on",
            open.entry_date, open.entry_price
        );
    }

    let summary = Summary::compute(&trades, config.initial_capital, capital);
    BacktestResult { trades, summary }
}
