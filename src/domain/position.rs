//! Open position and closed trade records.

use chrono::NaiveDate;
use std::fmt;

/// The single open position of a simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub entry_price: f64,
    pub entry_date: NaiveDate,
    pub shares: f64,
}

impl Position {
    /// Commit the whole of `capital` at `price`.
    pub fn open(entry_date: NaiveDate, price: f64, capital: f64) -> Self {
        Position {
            entry_price: price,
            entry_date,
            shares: capital / price,
        }
    }

    pub fn cost_basis(&self) -> f64 {
        self.entry_price * self.shares
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        (price - self.entry_price) * self.shares
    }

    /// Close the position at `price`, producing the trade record.
    pub fn close(self, exit_date: NaiveDate, price: f64, reason: ExitReason) -> Trade {
        let pnl = self.unrealized_pnl(price);
        let pnl_pct = pnl / self.cost_basis();
        Trade {
            entry_date: self.entry_date,
            exit_date,
            entry_price: self.entry_price,
            exit_price: price,
            shares: self.shares,
            pnl,
            pnl_pct,
            exit_reason: reason,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// Short MA crossed below the long MA.
    TrendReversal,
    /// RSI rose above the exit threshold.
    Overbought,
    /// Forced liquidation on the final bar.
    EndOfData,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::TrendReversal => write!(f, "trend_reversal"),
            ExitReason::Overbought => write!(f, "overbought"),
            ExitReason::EndOfData => write!(f, "end_of_data"),
        }
    }
}

/// A closed round trip. `pnl_pct` is a fraction of the cost basis.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub entry_price: f64,
    pub exit_price: f64,
    pub shares: f64,
    pub pnl: f64,
    pub pnl_pct: f64,
    pub exit_reason: ExitReason,
}

impl Trade {
    /// `pnl_pct` in percentage points.
    pub fn pnl_pct_points(&self) -> f64 {
        self.pnl_pct * 100.0
    }

    pub fn is_win(&self) -> bool {
        self.pnl > 0.0
    }

    pub fn holding_days(&self) -> i64 {
        (self.exit_date - self.entry_date).num_days()
    }
}

/// A trade tagged with the symbol it was simulated on.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolTrade {
    pub symbol: String,
    pub trade: Trade,
}
