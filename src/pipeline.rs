//! Run orchestration: fetch, signal, simulate, classify, report and notify
//! per symbol.
//!
//! Collaborator faults (data, model, report, notification) are logged and
//! never abort the run. A symbol whose data could not be fetched is processed as
//! an empty table and listed in [`RunOutcome::failed_symbols`].

use chrono::NaiveDate;
use log::{debug, error, info, warn};

use crate::domain::backtest::{run_backtest, BacktestConfig};
use crate::domain::classification::ModelMetrics;
use crate::domain::features::prepare_features;
use crate::domain::metrics::{aggregate_win_rate_pct, SummaryRow};
use crate::domain::ohlcv::{clean_bars, Bar};
use crate::domain::position::SymbolTrade;
use crate::domain::signal::{count_buy_signals, generate_signals, SignalParams};
use crate::ports::data_port::DataPort;
use crate::ports::model_port::ModelPort;
use crate::ports::notify_port::NotifyPort;
use crate::ports::report_port::ReportPort;

#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub symbols: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub signal_params: SignalParams,
    pub backtest: BacktestConfig,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOutcome {
    pub rows: Vec<SummaryRow>,
    pub trades: Vec<SymbolTrade>,
    pub failed_symbols: Vec<String>,
}

impl RunOutcome {
    pub fn total_trades(&self) -> usize {
        self.rows.iter().map(|r| r.summary.total_trades).sum()
    }

    pub fn win_rate_pct(&self) -> f64 {
        aggregate_win_rate_pct(self.rows.iter().map(|r| &r.summary))
    }
}

pub fn start_message(symbols: &[String]) -> String {
    format!(
        "Algo-trading system started for symbols: {}",
        symbols.join(", ")
    )
}

pub fn completion_message(outcome: &RunOutcome, symbols_processed: usize) -> String {
    format!(
        "Algo-trading system completed!\n\nTotal trades: {}\nAverage win rate: {:.1}%\nSymbols processed: {}",
        outcome.total_trades(),
        outcome.win_rate_pct(),
        symbols_processed
    )
}

fn notify(notifier: &dyn NotifyPort, message: &str, what: &str) {
    if let Err(e) = notifier.send(message) {
        warn!("Failed to send {} notification: {}", what, e);
    }
}

fn evaluate_model(model: &dyn ModelPort, symbol: &str, bars: &[Bar]) -> Option<ModelMetrics> {
    let features = prepare_features(bars);
    match model.evaluate(&features) {
        Ok(metrics) => {
            info!(
                "{}: logistic_accuracy={:.3}, tree_accuracy={:.3}",
                symbol, metrics.logistic.accuracy, metrics.tree.accuracy
            );
            Some(metrics)
        }
        Err(e) => {
            warn!("ML training skipped for {} due to error: {}", symbol, e);
            None
        }
    }
}

/// Run every configured symbol. `model` is optional; without it the summary
/// rows carry no classifier scores.
pub fn run_pipeline(
    data_source: &dyn DataPort,
    report: &dyn ReportPort,
    notifier: &dyn NotifyPort,
    model: Option<&dyn ModelPort>,
    config: &RunConfig,
) -> RunOutcome {
    notify(notifier, &start_message(&config.symbols), "start");

    let mut outcome = RunOutcome::default();

    for symbol in &config.symbols {
        info!("Processing {}", symbol);

        let raw = match data_source.fetch_bars(symbol, config.start_date, config.end_date) {
            Ok(raw) => raw,
            Err(e) => {
                error!("Data download failed for {}: {}", symbol, e);
                outcome.failed_symbols.push(symbol.clone());
                Vec::new()
            }
        };

        let bars = clean_bars(&raw);
        let signaled = generate_signals(&bars, &config.signal_params);
        let result = run_backtest(&signaled, &config.backtest);

        info!(
            "{}: {} bars, {} buy signals, {} trades, {:.1}% win rate, {:.2}% return",
            symbol,
            bars.len(),
            count_buy_signals(&signaled),
            result.summary.total_trades,
            result.summary.win_rate * 100.0,
            result.summary.cumulative_return_pct
        );

        if let Err(e) = report.log_signals(symbol, &signaled) {
            warn!("Failed to log signals for {}: {}", symbol, e);
        }

        outcome
            .trades
            .extend(result.trades.into_iter().map(|trade| SymbolTrade {
                symbol: symbol.clone(),
                trade,
            }));
        let ml = model.and_then(|m| evaluate_model(m, symbol, &bars));
        outcome.rows.push(SummaryRow {
            symbol: symbol.clone(),
            summary: result.summary,
            ml,
        });
    }

    debug!("Completed processing {} symbols", outcome.rows.len());

    if let Err(e) = report.log_trades(&outcome.trades) {
        warn!("Failed to log trades: {}", e);
    }
    if let Err(e) = report.log_summary(&outcome.rows) {
        warn!("Failed to log summary: {}", e);
    }

    notify(
        notifier,
        &completion_message(&outcome, config.symbols.len()),
        "completion",
    );

    outcome
}
