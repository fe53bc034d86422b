//! Yahoo Finance data adapter.
//!
//! Fetches daily bars from Yahoo's v8 chart API. Yahoo has no official API
//! and changes its format without notice; the CSV adapter is the usual
//! fallback. Retries are the caller's concern (see `FallbackDataSource`).

use crate::domain::error::TraderError;
use crate::domain::ohlcv::RawBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

pub struct YahooAdapter {
    client: reqwest::blocking::Client,
}

impl YahooAdapter {
    pub fn new() -> Result<Self, TraderError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| TraderError::DataFetch {
                source_name: "yahoo".to_string(),
                symbol: String::new(),
                reason: format!("failed to build HTTP client: {}", e),
            })?;
        Ok(Self { client })
    }

    fn chart_url(symbol: &str, start: NaiveDate, end: NaiveDate) -> String {
        let start_ts = start.and_time(chrono::NaiveTime::MIN).and_utc().timestamp();
        // Yahoo's period2 is exclusive
        let end_ts = (end + chrono::Duration::days(1))
            .and_time(chrono::NaiveTime::MIN)
            .and_utc()
            .timestamp();
        format!(
            "https://query2.finance.yahoo.com/v8/finance/chart/{symbol}\
             ?period1={start_ts}&period2={end_ts}&interval=1d&events=history"
        )
    }

    fn fetch_error(symbol: &str, reason: String) -> TraderError {
        TraderError::DataFetch {
            source_name: "yahoo".to_string(),
            symbol: symbol.to_string(),
            reason,
        }
    }

    fn parse_response(symbol: &str, resp: ChartResponse) -> Result<Vec<RawBar>, TraderError> {
        let parse_err = |reason: String| TraderError::DataParse {
            symbol: symbol.to_string(),
            reason,
        };

        let Some(results) = resp.chart.result else {
            return Err(match resp.chart.error {
                Some(err) => Self::fetch_error(symbol, format!("{}: {}", err.code, err.description)),
                None => parse_err("empty result with no error".into()),
            });
        };

        let data = results
            .into_iter()
            .next()
            .ok_or_else(|| parse_err("result array is empty".into()))?;

        // no timestamps means no trading days in range
        let Some(timestamps) = data.timestamp else {
            return Ok(Vec::new());
        };

        let quote = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| parse_err("no quote data".into()))?;

        let mut bars = Vec::with_capacity(timestamps.len());
        for (i, &ts) in timestamps.iter().enumerate() {
            let date = chrono::DateTime::from_timestamp(ts, 0)
                .map(|dt| dt.date_naive())
                .ok_or_else(|| parse_err(format!("invalid timestamp: {}", ts)))?;
            let at = |v: &Vec<Option<f64>>| v.get(i).copied().flatten();
            bars.push(RawBar {
                date,
                open: at(&quote.open),
                high: at(&quote.high),
                low: at(&quote.low),
                close: at(&quote.close),
                volume: at(&quote.volume),
            });
        }
        Ok(bars)
    }
}

impl DataPort for YahooAdapter {
    fn name(&self) -> &str {
        "yahoo"
    }

    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<RawBar>, TraderError> {
        let url = Self::chart_url(symbol, start_date, end_date);
        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| Self::fetch_error(symbol, e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Self::fetch_error(symbol, format!("HTTP {}", status)));
        }

        let chart: ChartResponse = resp.json().map_err(|e| TraderError::DataParse {
            symbol: symbol.to_string(),
            reason: format!("failed to parse chart response: {}", e),
        })?;

        let mut bars = Self::parse_response(symbol, chart)?;
        bars.retain(|b| b.date >= start_date && b.date <= end_date);
        Ok(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<Vec<RawBar>, TraderError> {
        let resp: ChartResponse = serde_json::from_str(json).unwrap();
        YahooAdapter::parse_response("TCS.NS", resp)
    }

    #[test]
    fn chart_url_covers_end_date() {
        let url = YahooAdapter::chart_url(
            "TCS.NS",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        );
        assert!(url.contains("/chart/TCS.NS?"));
        assert!(url.contains("period1=1704067200"));
        assert!(url.contains("period2=1704240000"));
        assert!(url.contains("interval=1d"));
    }

    #[test]
    fn parses_quotes_with_gaps() {
        let json = r#"{"chart":{"result":[{"timestamp":[1704096000,1704182400],
            "indicators":{"quote":[{"open":[10.0,null],"high":[11.0,null],
            "low":[9.5,null],"close":[10.5,null],"volume":[1200,null]}]}}],"error":null}}"#;
        let bars = parse(json).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(bars[0].close, Some(10.5));
        assert_eq!(bars[0].volume, Some(1200.0));
        assert_eq!(bars[1].close, None);
    }

    #[test]
    fn api_error_is_fetch_error() {
        let json = r#"{"chart":{"result":null,
            "error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        assert!(matches!(parse(json), Err(TraderError::DataFetch { .. })));
    }

    #[test]
    fn missing_timestamps_is_empty() {
        let json = r#"{"chart":{"result":[{"indicators":{"quote":[{}]}}],"error":null}}"#;
        assert!(parse(json).unwrap().is_empty());
    }
}
