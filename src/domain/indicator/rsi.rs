//! RSI (Relative Strength Index) indicator.
//!
//! Gains and losses of each close-to-close change are smoothed with Wilder's
//! factor alpha = 1/n, using bias-adjusted exponential weights:
//! avg = sum((1-a)^i * x[t-i]) / sum((1-a)^i) over the changes seen so far.
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100
//!
//! Warmup: first n bars are undefined (need n price changes).

pub fn calculate_rsi(series: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut values = Vec::with_capacity(series.len());
    if period == 0 {
        values.resize(series.len(), None);
        return values;
    }
    if series.is_empty() {
        return values;
    }

    let decay = 1.0 - 1.0 / period as f64;
    let mut gain_num = 0.0;
    let mut loss_num = 0.0;
    let mut weight = 0.0;

    // bar 0 has no change
    values.push(None);

    for (i, pair) in series.windows(2).enumerate() {
        let change = pair[1] - pair[0];
        let gain = if change > 0.0 { change } else { 0.0 };
        let loss = if change < 0.0 { -change } else { 0.0 };

        gain_num = gain + decay * gain_num;
        loss_num = loss + decay * loss_num;
        weight = 1.0 + decay * weight;

        let observed = i + 1;
        if observed < period {
            values.push(None);
            continue;
        }

        let avg_gain = gain_num / weight;
        let avg_loss = loss_num / weight;
        values.push(Some(rsi_from_averages(avg_gain, avg_loss)));
    }

    values
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
    }
}
