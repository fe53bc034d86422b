//! Tabular report port trait.
//!
//! Each method replaces one worksheet (`Signals`, `Trades`, `Summary`).

use crate::domain::error::TraderError;
use crate::domain::metrics::SummaryRow;
use crate::domain::position::SymbolTrade;
use crate::domain::signal::SignaledBar;

pub trait ReportPort {
    fn log_signals(&self, symbol: &str, signaled: &[SignaledBar]) -> Result<(), TraderError>;

    fn log_trades(&self, trades: &[SymbolTrade]) -> Result<(), TraderError>;

    fn log_summary(&self, rows: &[SummaryRow]) -> Result<(), TraderError>;
}
