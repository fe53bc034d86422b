//! Per-symbol summary statistics.

use super::classification::ModelMetrics;
use super::position::Trade;

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total_trades: usize,
    pub wins: usize,
    pub losses: usize,
    pub win_rate: f64,
    pub cumulative_return_pct: f64,
    pub final_capital: f64,
}

impl Summary {
    /// Reduce a trade ledger. Breakeven trades count as losses.
    pub fn compute(trades: &[Trade], initial_capital: f64, final_capital: f64) -> Self {
        let total_trades = trades.len();
        let wins = trades.iter().filter(|t| t.is_win()).count();
        let losses = total_trades - wins;

        let win_rate = if total_trades > 0 {
            wins as f64 / total_trades as f64
        } else {
            0.0
        };

        let cumulative_return_pct = if initial_capital > 0.0 {
            (final_capital / initial_capital - 1.0) * 100.0
        } else {
            0.0
        };

        Summary {
            total_trades,
            wins,
            losses,
            win_rate,
            cumulative_return_pct,
            final_capital,
        }
    }

    pub fn empty(initial_capital: f64) -> Self {
        Self::compute(&[], initial_capital, initial_capital)
    }
}

/// One line of the summary table. `ml` is `None` when the classifiers
/// were disabled or could not be trained for the symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub symbol: String,
    pub summary: Summary,
    pub ml: Option<ModelMetrics>,
}

/// Win rate across many summaries, in percent: total wins / total trades.
pub fn aggregate_win_rate_pct<'a, I>(summaries: I) -> f64
where
    I: IntoIterator<Item = &'a Summary>,
{
    let (wins, trades) = summaries
        .into_iter()
        .fold((0usize, 0usize), |(w, t), s| (w + s.wins, t + s.total_trades));
    if trades > 0 {
        wins as f64 / trades as f64 * 100.0
    } else {
        0.0
    }
}
