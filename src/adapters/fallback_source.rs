//! Primary/fallback market data selection with bounded retries.

use crate::domain::error::TraderError;
use crate::domain::ohlcv::RawBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use log::{debug, warn};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Call `op` until it succeeds or `max_attempts` calls have failed,
    /// sleeping `delay` between attempts. Returns the last error.
    pub fn run<T, F>(&self, label: &str, mut op: F) -> Result<T, TraderError>
    where
        F: FnMut() -> Result<T, TraderError>,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(e) => {
                    warn!("{} failed (attempt {}/{}): {}", label, attempt, attempts, e);
                    if attempt >= attempts {
                        return Err(e);
                    }
                }
            }
            if !self.delay.is_zero() {
                thread::sleep(self.delay);
            }
            attempt += 1;
        }
    }
}

/// Tries the primary source under the retry policy, then the fallback (if
/// any) under the same policy. A source that answers with no rows is a
/// success; only errors trigger the fallback.
pub struct FallbackDataSource {
    primary: Box<dyn DataPort>,
    fallback: Option<Box<dyn DataPort>>,
    policy: RetryPolicy,
}

impl FallbackDataSource {
    pub fn new(
        primary: Box<dyn DataPort>,
        fallback: Option<Box<dyn DataPort>>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            primary,
            fallback,
            policy,
        }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    fn fetch_from(
        &self,
        source: &dyn DataPort,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawBar>, TraderError> {
        let label = format!("{} download for {}", source.name(), symbol);
        let bars = self
            .policy
            .run(&label, || source.fetch_bars(symbol, start, end))?;
        if bars.is_empty() {
            warn!("No data returned for {} from {}", symbol, source.name());
        }
        Ok(bars)
    }
}

impl DataPort for FallbackDataSource {
    fn name(&self) -> &str {
        self.primary.name()
    }

    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<RawBar>, TraderError> {
        debug!(
            "Fetching {} from {} to {} via {}",
            symbol,
            start_date,
            end_date,
            self.primary.name()
        );
        let primary_err = match self.fetch_from(self.primary.as_ref(), symbol, start_date, end_date) {
            Ok(bars) => return Ok(bars),
            Err(e) => e,
        };

        let Some(fallback) = self.fallback.as_deref() else {
            return Err(primary_err);
        };
        warn!(
            "{} download failed for {} ({}). Falling back to {}.",
            self.primary.name(),
            symbol,
            primary_err,
            fallback.name()
        );
        self.fetch_from(fallback, symbol, start_date, end_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Fails the first `failures` calls, then returns one row.
    struct FlakySource {
        name: &'static str,
        failures: u32,
        calls: Rc<Cell<u32>>,
    }

    impl FlakySource {
        fn new(name: &'static str, failures: u32) -> (Self, Rc<Cell<u32>>) {
            let calls = Rc::new(Cell::new(0));
            (
                Self {
                    name,
                    failures,
                    calls: Rc::clone(&calls),
                },
                calls,
            )
        }
    }

    impl DataPort for FlakySource {
        fn name(&self) -> &str {
            self.name
        }

        fn fetch_bars(
            &self,
            symbol: &str,
            start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<Vec<RawBar>, TraderError> {
            let n = self.calls.get() + 1;
            self.calls.set(n);
            if n <= self.failures {
                return Err(TraderError::DataFetch {
                    source_name: self.name.to_string(),
                    symbol: symbol.to_string(),
                    reason: format!("attempt {} refused", n),
                });
            }
            Ok(vec![RawBar {
                date: start,
                open: None,
                high: None,
                low: None,
                close: Some(10.0),
                volume: Some(1.0),
            }])
        }
    }

    fn no_delay(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            delay: Duration::ZERO,
        }
    }

    fn range() -> (NaiveDate, NaiveDate) {
        (
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        )
    }

    #[test]
    fn default_policy() {
        let p = RetryPolicy::default();
        assert_eq!(p.max_attempts, 3);
        assert_eq!(p.delay, Duration::from_secs(5));
    }

    #[test]
    fn retry_succeeds_within_budget() {
        let (primary, calls) = FlakySource::new("yahoo", 2);
        let source = FallbackDataSource::new(Box::new(primary), None, no_delay(3));
        let (start, end) = range();
        let bars = source.fetch_bars("TCS.NS", start, end).unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn exhausted_primary_without_fallback_is_error() {
        let (primary, calls) = FlakySource::new("yahoo", 10);
        let source = FallbackDataSource::new(Box::new(primary), None, no_delay(3));
        let (start, end) = range();
        let result = source.fetch_bars("TCS.NS", start, end);
        assert!(matches!(result, Err(TraderError::DataFetch { .. })));
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn falls_back_after_primary_exhausted() {
        let (primary, primary_calls) = FlakySource::new("yahoo", 10);
        let (fallback, fallback_calls) = FlakySource::new("csv", 0);
        let source =
            FallbackDataSource::new(Box::new(primary), Some(Box::new(fallback)), no_delay(2));
        let (start, end) = range();
        let bars = source.fetch_bars("INFY.NS", start, end).unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(primary_calls.get(), 2);
        assert_eq!(fallback_calls.get(), 1);
    }

    #[test]
    fn fallback_unused_when_primary_succeeds() {
        let (primary, _) = FlakySource::new("yahoo", 0);
        let (fallback, fallback_calls) = FlakySource::new("csv", 0);
        let source =
            FallbackDataSource::new(Box::new(primary), Some(Box::new(fallback)), no_delay(3));
        let (start, end) = range();
        source.fetch_bars("INFY.NS", start, end).unwrap();
        assert_eq!(fallback_calls.get(), 0);
        assert_eq!(source.name(), "yahoo");
    }

    #[test]
    fn both_sources_exhausted_reports_fallback_error() {
        let (primary, primary_calls) = FlakySource::new("yahoo", 100);
        let (fallback, fallback_calls) = FlakySource::new("csv", 100);
        let source =
            FallbackDataSource::new(Box::new(primary), Some(Box::new(fallback)), no_delay(2));
        let (start, end) = range();
        match source.fetch_bars("A", start, end) {
            Err(TraderError::DataFetch { source_name, .. }) => assert_eq!(source_name, "csv"),
            other => panic!("expected DataFetch, got {:?}", other),
        }
        assert_eq!(primary_calls.get(), 2);
        assert_eq!(fallback_calls.get(), 2);
    }

    #[test]
    fn zero_attempts_still_tries_once() {
        let (primary, calls) = FlakySource::new("csv", 0);
        let source = FallbackDataSource::new(Box::new(primary), None, no_delay(0));
        let (start, end) = range();
        assert!(source.fetch_bars("X", start, end).is_ok());
        assert_eq!(calls.get(), 1);
    }
}
