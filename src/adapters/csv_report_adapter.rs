//! CSV report sink: one file per worksheet in an output directory.
//!
//! Every call rewrites its worksheet from scratch. Signals are kept for the
//! lifetime of the adapter so the `Signals` sheet holds every symbol of the
//! run, not just the last one.

use crate::domain::classification::{ClassificationMetrics, ModelMetrics};
use crate::domain::error::TraderError;
use crate::domain::metrics::SummaryRow;
use crate::domain::position::SymbolTrade;
use crate::domain::signal::SignaledBar;
use crate::ports::report_port::ReportPort;
use log::info;
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

pub const SIGNALS_SHEET: &str = "Signals";
pub const TRADES_SHEET: &str = "Trades";
pub const SUMMARY_SHEET: &str = "Summary";

const SIGNAL_HEADER: [&str; 15] = [
    "symbol",
    "date",
    "open",
    "high",
    "low",
    "close",
    "volume",
    "rsi",
    "sma_short",
    "sma_long",
    "ma_diff",
    "macd_line",
    "macd_signal",
    "macd_histogram",
    "signal",
];

const TRADE_HEADER: [&str; 9] = [
    "symbol",
    "entry_date",
    "exit_date",
    "entry_price",
    "exit_price",
    "shares",
    "pnl",
    "pnl_pct",
    "exit_reason",
];

const SUMMARY_HEADER: [&str; 17] = [
    "symbol",
    "total_trades",
    "wins",
    "losses",
    "win_rate",
    "cumulative_return_pct",
    "final_capital",
    "logistic_accuracy",
    "logistic_precision",
    "logistic_recall",
    "logistic_f1",
    "logistic_roc_auc",
    "tree_accuracy",
    "tree_precision",
    "tree_recall",
    "tree_f1",
    "tree_roc_auc",
];

pub struct CsvReportAdapter {
    output_dir: PathBuf,
    signal_rows: RefCell<Vec<Vec<String>>>,
}

impl CsvReportAdapter {
    pub fn new(output_dir: PathBuf) -> Result<Self, TraderError> {
        fs::create_dir_all(&output_dir)?;
        Ok(Self {
            output_dir,
            signal_rows: RefCell::new(Vec::new()),
        })
    }

    pub fn sheet_path(&self, sheet: &str) -> PathBuf {
        self.output_dir.join(format!("{}.csv", sheet))
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn write_sheet(&self, sheet: &str, header: &[&str], rows: &[Vec<String>]) -> Result<(), TraderError> {
        let report_err = |e: csv::Error| TraderError::Report {
            sheet: sheet.to_string(),
            reason: e.to_string(),
        };

        let mut wtr = csv::Writer::from_path(self.sheet_path(sheet)).map_err(report_err)?;
        wtr.write_record(header).map_err(report_err)?;
        for row in rows {
            wtr.write_record(row).map_err(report_err)?;
        }
        wtr.flush()?;
        info!("Wrote {} rows to worksheet '{}'", rows.len(), sheet);
        Ok(())
    }
}

fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn metric_cells(metrics: Option<&ClassificationMetrics>) -> [String; 5] {
    let get = |f: fn(&ClassificationMetrics) -> f64| cell(metrics.map(f));
    [
        get(|m| m.accuracy),
        get(|m| m.precision),
        get(|m| m.recall),
        get(|m| m.f1),
        get(|m| m.roc_auc),
    ]
}

fn signal_row(symbol: &str, sb: &SignaledBar) -> Vec<String> {
    let ind = &sb.indicators;
    vec![
        symbol.to_string(),
        sb.bar.date.to_string(),
        sb.bar.open.to_string(),
        sb.bar.high.to_string(),
        sb.bar.low.to_string(),
        sb.bar.close.to_string(),
        sb.bar.volume.to_string(),
        cell(ind.rsi),
        cell(ind.sma_short),
        cell(ind.sma_long),
        cell(ind.ma_diff),
        cell(ind.macd_line),
        cell(ind.macd_signal),
        cell(ind.macd_histogram),
        sb.signal.as_int().to_string(),
    ]
}

impl ReportPort for CsvReportAdapter {
    fn log_signals(&self, symbol: &str, signaled: &[SignaledBar]) -> Result<(), TraderError> {
        let mut rows = self.signal_rows.borrow_mut();
        rows.extend(signaled.iter().map(|sb| signal_row(symbol, sb)));
        self.write_sheet(SIGNALS_SHEET, &SIGNAL_HEADER, &rows)
    }

    fn log_trades(&self, trades: &[SymbolTrade]) -> Result<(), TraderError> {
        let rows: Vec<Vec<String>> = trades
            .iter()
            .map(|st| {
                let t = &st.trade;
                vec![
                    st.symbol.clone(),
                    t.entry_date.to_string(),
                    t.exit_date.to_string(),
                    t.entry_price.to_string(),
                    t.exit_price.to_string(),
                    t.shares.to_string(),
                    t.pnl.to_string(),
                    t.pnl_pct_points().to_string(),
                    t.exit_reason.to_string(),
                ]
            })
            .collect();
        self.write_sheet(TRADES_SHEET, &TRADE_HEADER, &rows)
    }

    fn log_summary(&self, summary_rows: &[SummaryRow]) -> Result<(), TraderError> {
        let rows: Vec<Vec<String>> = summary_rows
            .iter()
            .map(|r| {
                let s = &r.summary;
                let ml: Option<&ModelMetrics> = r.ml.as_ref();
                let mut row = vec![
                    r.symbol.clone(),
                    s.total_trades.to_string(),
                    s.wins.to_string(),
                    s.losses.to_string(),
                    s.win_rate.to_string(),
                    s.cumulative_return_pct.to_string(),
                    s.final_capital.to_string(),
                ];
                row.extend(metric_cells(ml.map(|m| &m.logistic)));
                row.extend(metric_cells(ml.map(|m| &m.tree)));
                row
            })
            .collect();
        self.write_sheet(SUMMARY_SHEET, &SUMMARY_HEADER, &rows)
    }
}

/// Report sink used when reporting is disabled.
pub struct NullReport;

impl ReportPort for NullReport {
    fn log_signals(&self, _symbol: &str, _signaled: &[SignaledBar]) -> Result<(), TraderError> {
        Ok(())
    }

    fn log_trades(&self, _trades: &[SymbolTrade]) -> Result<(), TraderError> {
        Ok(())
    }

    fn log_summary(&self, _rows: &[SummaryRow]) -> Result<(), TraderError> {
        Ok(())
    }
}
