//! Feature and label preparation for the next-day direction classifiers.
//!
//! Each bar yields fifteen features: its indicators, one-bar lags, and
//! rolling price and volume statistics. The label is whether the next close
//! beats the current one by more than [`UP_MOVE_THRESHOLD`]. Bars where any
//! feature or the label is undefined or non-finite are dropped.

use chrono::NaiveDate;

use super::indicator::macd::{calculate_macd_default, MacdSeries};
use super::indicator::{calculate_rsi, calculate_sma};
use super::ohlcv::{closes, Bar};

pub const FEATURE_COUNT: usize = 15;

pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "rsi",
    "sma10",
    "sma20",
    "sma50",
    "macd_line",
    "macd_signal",
    "macd_hist",
    "volume",
    "rsi_lag1",
    "macd_hist_lag1",
    "close_lag1",
    "roc",
    "volatility",
    "vol_change",
    "vol_sma10",
];

pub const FEATURE_RSI_PERIOD: usize = 14;

/// Fractional rise of the next close needed for a positive label.
pub const UP_MOVE_THRESHOLD: f64 = 0.002;

const ROC_PERIOD: usize = 3;
const VOLATILITY_WINDOW: usize = 5;
const VOLUME_SMA_WINDOW: usize = 10;

pub type FeatureRow = [f64; FEATURE_COUNT];

/// Feature matrix with one label per row, in date order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureSet {
    pub dates: Vec<NaiveDate>,
    pub rows: Vec<FeatureRow>,
    pub labels: Vec<bool>,
}

impl FeatureSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn positives(&self) -> usize {
        self.labels.iter().filter(|l| **l).count()
    }

    /// Rows `range` as a new set. The range must lie within `0..len()`.
    pub fn slice(&self, range: std::ops::Range<usize>) -> FeatureSet {
        FeatureSet {
            dates: self.dates[range.clone()].to_vec(),
            rows: self.rows[range.clone()].to_vec(),
            labels: self.labels[range].to_vec(),
        }
    }

    fn push(&mut self, date: NaiveDate, row: FeatureRow, label: bool) {
        self.dates.push(date);
        self.rows.push(row);
        self.labels.push(label);
    }
}

struct Columns<'a> {
    closes: &'a [f64],
    volumes: &'a [f64],
    rsi: Vec<Option<f64>>,
    sma10: Vec<Option<f64>>,
    sma20: Vec<Option<f64>>,
    sma50: Vec<Option<f64>>,
    macd: MacdSeries,
    vol_sma: Vec<Option<f64>>,
}

fn lag(values: &[Option<f64>], i: usize) -> Option<f64> {
    values[i.checked_sub(1)?]
}

fn pct_change(values: &[f64], i: usize, periods: usize) -> Option<f64> {
    let prev = values[i.checked_sub(periods)?];
    Some(values[i] / prev - 1.0)
}

/// Sample standard deviation (n - 1) of the window ending at `i`.
fn rolling_std(values: &[f64], i: usize, window: usize) -> Option<f64> {
    if window < 2 || i + 1 < window {
        return None;
    }
    let slice = &values[i + 1 - window..=i];
    let mean = slice.iter().sum::<f64>() / window as f64;
    let var = slice.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (window - 1) as f64;
    Some(var.sqrt())
}

impl Columns<'_> {
    fn row(&self, i: usize) -> Option<FeatureRow> {
        let row = [
            self.rsi[i]?,
            self.sma10[i]?,
            self.sma20[i]?,
            self.sma50[i]?,
            self.macd.line[i]?,
            self.macd.signal[i]?,
            self.macd.histogram[i]?,
            self.volumes[i],
            lag(&self.rsi, i)?,
            lag(&self.macd.histogram, i)?,
            self.closes[i.checked_sub(1)?],
            pct_change(self.closes, i, ROC_PERIOD)?,
            rolling_std(self.closes, i, VOLATILITY_WINDOW)?,
            pct_change(self.volumes, i, 1)?,
            self.vol_sma[i]?,
        ];
        row.iter().all(|v| v.is_finite()).then_some(row)
    }
}

/// Build the feature matrix and labels for a cleaned bar series.
///
/// The last bar never produces a row since its label needs the next close.
pub fn prepare_features(bars: &[Bar]) -> FeatureSet {
    let closes = closes(bars);
    let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();
    let columns = Columns {
        closes: &closes,
        volumes: &volumes,
        rsi: calculate_rsi(&closes, FEATURE_RSI_PERIOD),
        sma10: calculate_sma(&closes, 10),
        sma20: calculate_sma(&closes, 20),
        sma50: calculate_sma(&closes, 50),
        macd: calculate_macd_default(&closes),
        vol_sma: calculate_sma(&volumes, VOLUME_SMA_WINDOW),
    };

    let mut set = FeatureSet::default();
    for i in 0..bars.len().saturating_sub(1) {
        let Some(row) = columns.row(i) else {
            continue;
        };
        let label = closes[i + 1] > closes[i] * (1.0 + UP_MOVE_THRESHOLD);
        set.push(bars[i].date, row, label);
    }
    set
}
