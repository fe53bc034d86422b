//! Exponential Moving Average indicator.
//!
//! k = 2/(n+1), seeded with the first close, then EMA[i] = C[i]*k + EMA[i-1]*(1-k).
//! No warmup: defined from the first bar.

pub fn calculate_ema(series: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; series.len()];
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut values = Vec::with_capacity(series.len());
    let mut ema: Option<f64> = None;

    for &close in series {
        let next = match ema {
            None => close,
            Some(prev) => close * k + prev * (1.0 - k),
        };
        ema = Some(next);
        values.push(ema);
    }

    values
}

/// EMA over a series that may itself contain undefined values.
///
/// The average is seeded by the first defined value and only advances on
/// defined inputs; an undefined input yields an undefined output.
pub fn calculate_ema_partial(series: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; series.len()];
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut ema: Option<f64> = None;

    series
        .iter()
        .map(|value| {
            let close = (*value)?;
            let next = match ema {
                None => close,
                Some(prev) => close * k + prev * (1.0 - k),
            };
            ema = Some(next);
            ema
        })
        .collect()
}
