//! CSV file data adapter.
//!
//! Reads `<base_path>/<SYMBOL>.csv` in the Yahoo download layout
//! (`Date,Open,High,Low,Close,Adj Close,Volume`). Columns are located by
//! header name, so column order and extra columns do not matter.

use crate::domain::error::TraderError;
use crate::domain::ohlcv::RawBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

struct Columns {
    date: usize,
    open: Option<usize>,
    high: Option<usize>,
    low: Option<usize>,
    close: usize,
    volume: Option<usize>,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    fn locate_columns(symbol: &str, headers: &csv::StringRecord) -> Result<Columns, TraderError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let required = |name: &str| {
            find(name).ok_or_else(|| TraderError::DataParse {
                symbol: symbol.to_string(),
                reason: format!("missing {} column", name),
            })
        };

        Ok(Columns {
            date: required("date")?,
            open: find("open"),
            high: find("high"),
            low: find("low"),
            close: required("close")?,
            volume: find("volume"),
        })
    }
}

/// Empty cells and the `null` / `NaN` markers are missing values.
fn parse_cell(
    symbol: &str,
    record: &csv::StringRecord,
    column: Option<usize>,
    name: &str,
) -> Result<Option<f64>, TraderError> {
    let Some(raw) = column.and_then(|i| record.get(i)) else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("null") || raw.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    raw.parse::<f64>()
        .map(Some)
        .map_err(|e| TraderError::DataParse {
            symbol: symbol.to_string(),
            reason: format!("invalid {} value {:?}: {}", name, raw, e),
        })
}

impl DataPort for CsvAdapter {
    fn name(&self) -> &str {
        "csv"
    }

    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<RawBar>, TraderError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| TraderError::DataFetch {
            source_name: self.name().to_string(),
            symbol: symbol.to_string(),
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| TraderError::DataParse {
                symbol: symbol.to_string(),
                reason: format!("CSV header error: {}", e),
            })?
            .clone();
        let cols = Self::locate_columns(symbol, &headers)?;

        let mut bars = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| TraderError::DataParse {
                symbol: symbol.to_string(),
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = record.get(cols.date).unwrap_or_default().trim();
            // tolerate timestamps such as "2024-01-15 00:00:00+05:30"
            let date_part = date_str.get(..10).unwrap_or(date_str);
            let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|e| {
                TraderError::DataParse {
                    symbol: symbol.to_string(),
                    reason: format!("invalid date {:?}: {}", date_str, e),
                }
            })?;

            if date < start_date || date > end_date {
                continue;
            }

            bars.push(RawBar {
                date,
                open: parse_cell(symbol, &record, cols.open, "open")?,
                high: parse_cell(symbol, &record, cols.high, "high")?,
                low: parse_cell(symbol, &record, cols.low, "low")?,
                close: parse_cell(symbol, &record, Some(cols.close), "close")?,
                volume: parse_cell(symbol, &record, cols.volume, "volume")?,
            });
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }
}
