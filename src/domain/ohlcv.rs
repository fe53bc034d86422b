//! Price bar representation and input cleaning.

use chrono::NaiveDate;
use log::debug;

/// A row as delivered by a data source. Any field may be missing.
#[derive(Debug, Clone, PartialEq)]
pub struct RawBar {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
}

/// A cleaned daily bar. `close` is finite and positive, `volume` is finite.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// A bar with open/high/low pinned to the close.
    pub fn from_close(date: NaiveDate, close: f64, volume: f64) -> Self {
        Bar {
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume,
        }
    }
}

fn finite(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite())
}

/// Drop rows with a missing or non-positive close or a missing volume, then
/// order by date.
///
/// Duplicate dates keep their first occurrence so the result is strictly
/// increasing in date.
pub fn clean_bars(raw: &[RawBar]) -> Vec<Bar> {
    let mut bars: Vec<Bar> = raw
        .iter()
        .filter_map(|r| {
            let close = finite(r.close).filter(|c| *c > 0.0)?;
            let volume = finite(r.volume)?;
            Some(Bar {
                date: r.date,
                open: finite(r.open).unwrap_or(close),
                high: finite(r.high).unwrap_or(close),
                low: finite(r.low).unwrap_or(close),
                close,
                volume,
            })
        })
        .collect();

    bars.sort_by_key(|b| b.date);
    bars.dedup_by_key(|b| b.date);

    let dropped = raw.len() - bars.len();
    if dropped > 0 {
        debug!("dropped {} incomplete or duplicate rows", dropped);
    }
    bars
}

/// Close prices in bar order.
pub fn closes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(day: u32, close: Option<f64>, volume: Option<f64>) -> RawBar {
        RawBar {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: None,
            high: None,
            low: None,
            close,
            volume,
        }
    }

    #[test]
    fn drops_missing_close_or_volume() {
        let rows = vec![
            raw(1, Some(100.0), Some(1000.0)),
            raw(2, None, Some(1000.0)),
            raw(3, Some(101.0), None),
            raw(4, Some(f64::NAN), Some(1000.0)),
            raw(5, Some(102.0), Some(900.0)),
        ];
        let bars = clean_bars(&rows);
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(bars[1].date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
    }

    #[test]
    fn drops_non_positive_close() {
        let rows = vec![
            raw(1, Some(0.0), Some(1000.0)),
            raw(2, Some(-3.5), Some(1000.0)),
            raw(3, Some(5.0), Some(1000.0)),
        ];
        let bars = clean_bars(&rows);
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].close, 5.0);
    }

    #[test]
    fn sorts_and_dedups_dates() {
        let rows = vec![
            raw(3, Some(103.0), Some(1.0)),
            raw(1, Some(101.0), Some(1.0)),
            raw(3, Some(999.0), Some(1.0)),
            raw(2, Some(102.0), Some(1.0)),
        ];
        let bars = clean_bars(&rows);
        let dates: Vec<u32> = bars.iter().map(|b| chrono::Datelike::day(&b.date)).collect();
        assert_eq!(dates, vec![1, 2, 3]);
        assert!(bars.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn missing_ohl_falls_back_to_close() {
        let bars = clean_bars(&[raw(1, Some(50.0), Some(10.0))]);
        assert_eq!(bars[0].open, 50.0);
        assert_eq!(bars[0].high, 50.0);
        assert_eq!(bars[0].low, 50.0);
    }

    #[test]
    fn empty_and_all_missing_yield_nothing() {
        assert!(clean_bars(&[]).is_empty());
        assert!(clean_bars(&[raw(1, None, None), raw(2, None, Some(1.0))]).is_empty());
    }

    #[test]
    fn closes_in_order() {
        let bars = vec![
            Bar::from_close(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 1.0, 0.0),
            Bar::from_close(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), 2.0, 0.0),
        ];
        assert_eq!(closes(&bars), vec![1.0, 2.0]);
    }
}
