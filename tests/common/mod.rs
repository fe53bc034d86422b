#![allow(dead_code)]

use chrono::NaiveDate;
use rsi_trend::domain::classification::{ClassificationMetrics, ModelMetrics};
use rsi_trend::domain::error::TraderError;
use rsi_trend::domain::features::FeatureSet;
use rsi_trend::domain::metrics::SummaryRow;
pub use rsi_trend::domain::ohlcv::{Bar, RawBar};
use rsi_trend::domain::position::SymbolTrade;
use rsi_trend::domain::signal::{IndicatorSet, Signal, SignalParams, SignaledBar};
use rsi_trend::ports::data_port::DataPort;
use rsi_trend::ports::model_port::ModelPort;
use rsi_trend::ports::notify_port::NotifyPort;
use rsi_trend::ports::report_port::ReportPort;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<RawBar>>,
    pub errors: HashMap<String, String>,
    pub calls: Cell<usize>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            calls: Cell::new(0),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<RawBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn name(&self) -> &str {
        "mock"
    }

    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<RawBar>, TraderError> {
        self.calls.set(self.calls.get() + 1);
        if let Some(reason) = self.errors.get(symbol) {
            return Err(TraderError::DataFetch {
                source_name: "mock".into(),
                symbol: symbol.to_string(),
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(symbol)
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.date >= start_date && b.date <= end_date)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// Records every report call; optionally fails all of them.
#[derive(Default)]
pub struct RecordingReport {
    pub signals: RefCell<Vec<(String, usize)>>,
    pub trades: RefCell<Vec<SymbolTrade>>,
    pub summary: RefCell<Vec<SummaryRow>>,
    pub fail: bool,
}

impl RecordingReport {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn check(&self, sheet: &str) -> Result<(), TraderError> {
        if self.fail {
            return Err(TraderError::Report {
                sheet: sheet.into(),
                reason: "sheet unavailable".into(),
            });
        }
        Ok(())
    }
}

impl ReportPort for RecordingReport {
    fn log_signals(&self, symbol: &str, signaled: &[SignaledBar]) -> Result<(), TraderError> {
        self.signals
            .borrow_mut()
            .push((symbol.to_string(), signaled.len()));
        self.check("Signals")
    }

    fn log_trades(&self, trades: &[SymbolTrade]) -> Result<(), TraderError> {
        *self.trades.borrow_mut() = trades.to_vec();
        self.check("Trades")
    }

    fn log_summary(&self, rows: &[SummaryRow]) -> Result<(), TraderError> {
        *self.summary.borrow_mut() = rows.to_vec();
        self.check("Summary")
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub messages: RefCell<Vec<String>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

impl NotifyPort for RecordingNotifier {
    fn send(&self, message: &str) -> Result<(), TraderError> {
        self.messages.borrow_mut().push(message.to_string());
        if self.fail {
            return Err(TraderError::Notify {
                reason: "chat unreachable".into(),
            });
        }
        Ok(())
    }
}

/// Returns fixed scores and records the feature row count of every call.
#[derive(Default)]
pub struct StubModel {
    pub seen_rows: RefCell<Vec<usize>>,
    pub fail: bool,
}

impl StubModel {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn metrics() -> ModelMetrics {
        let scores = |accuracy: f64| ClassificationMetrics {
            accuracy,
            precision: 0.5,
            recall: 0.5,
            f1: 0.5,
            roc_auc: 0.5,
        };
        ModelMetrics {
            logistic: scores(0.75),
            tree: scores(0.625),
        }
    }
}

impl ModelPort for StubModel {
    fn name(&self) -> &str {
        "stub"
    }

    fn evaluate(&self, features: &FeatureSet) -> Result<ModelMetrics, TraderError> {
        self.seen_rows.borrow_mut().push(features.len());
        if self.fail {
            return Err(TraderError::Model {
                reason: "only one class present".into(),
            });
        }
        Ok(Self::metrics())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// The `i`-th consecutive calendar day from 2024-01-01.
pub fn day(i: usize) -> NaiveDate {
    date(2024, 1, 1) + chrono::Duration::days(i as i64)
}

pub fn raw_bar(date: NaiveDate, close: f64) -> RawBar {
    RawBar {
        date,
        open: Some(close),
        high: Some(close),
        low: Some(close),
        close: Some(close),
        volume: Some(1_000.0),
    }
}

pub fn raw_series(closes: &[f64]) -> Vec<RawBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| raw_bar(day(i), c))
        .collect()
}

pub fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| Bar::from_close(day(i), c, 1_000.0))
        .collect()
}

/// A short uptrend with one sharp dip (a buy on bar 6) and a rebound
/// that crosses the short MA under the long MA on bar 7.
pub const DIP_CLOSES: [f64; 8] = [10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 32.0, 60.0];

pub fn fast_params() -> SignalParams {
    SignalParams {
        rsi_period: 2,
        short_window: 2,
        long_window: 4,
        ..SignalParams::default()
    }
}

/// Hand-built signaled bars: (close, buy, rsi, ma_diff).
pub fn signaled_rows(rows: &[(f64, bool, Option<f64>, Option<f64>)]) -> Vec<SignaledBar> {
    let mut prev = None;
    rows.iter()
        .enumerate()
        .map(|(i, &(close, buy, rsi, ma_diff))| {
            let indicators = IndicatorSet {
                rsi,
                ma_diff,
                ma_diff_prev: prev,
                ..IndicatorSet::default()
            };
            prev = ma_diff;
            SignaledBar {
                bar: Bar::from_close(day(i), close, 1_000.0),
                indicators,
                signal: if buy { Signal::Buy } else { Signal::Hold },
            }
        })
        .collect()
}
