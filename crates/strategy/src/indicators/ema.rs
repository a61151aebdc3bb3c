/// Exponential Moving Average over a whole series.
///
/// Returns a series of the same length as `values`. Indices before
/// `period - 1` are `NaN`. `ema[period-1]` is the SMA of the first `period`
/// values, then `ema[t] = k * values[t] + (1 - k) * ema[t-1]` with
/// `k = 2 / (period + 1)`. A window shorter than `period` is all `NaN`.
pub fn ema_series(values: &[f64], period: usize) -> Vec<f64> {
    let period = period.max(1);
    let mut out = vec![f64::NAN; values.len()];
    if values.len() < period {
        return out;
    }
    let k = 2.0 / (period as f64 + 1.0);

    // Seed with SMA of first `period` values
    let mut ema_val = values[..period].iter().sum::<f64>() / period as f64;
    out[period - 1] = ema_val;

    for (i, &v) in values.iter().enumerate().skip(period) {
        ema_val = v * k + ema_val * (1.0 - k);
        out[i] = ema_val;
    }
    out
}

/// Latest value of an EMA series, `None` while it is still warming up.
pub fn latest_defined(series: &[f64]) -> Option<f64> {
    series.last().copied().filter(|v| v.is_finite())
}
