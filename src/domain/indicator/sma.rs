//! Simple Moving Average.
//!
//! Mean of the trailing `window` closes. Warmup: first (window-1) bars are undefined.

pub fn calculate_sma(series: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; series.len()];
    }

    let mut values = Vec::with_capacity(series.len());
    for i in 0..series.len() {
        if i + 1 < window {
            values.push(None);
        } else {
            let sum: f64 = series[i + 1 - window..=i].iter().sum();
            values.push(Some(sum / window as f64));
        }
    }
    values
}
