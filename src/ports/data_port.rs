//! Market data source port trait.

use crate::domain::error::TraderError;
use crate::domain::ohlcv::RawBar;
use chrono::NaiveDate;

pub trait DataPort {
    /// Short identifier used in logs and errors.
    fn name(&self) -> &str;

    /// Daily rows for `symbol` within `[start_date, end_date]`, oldest first.
    /// Rows may carry missing values.
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<RawBar>, TraderError>;
}
