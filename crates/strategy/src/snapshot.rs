use chrono::{DateTime, Utc};

use common::Candle;

use crate::indicators::{ema_series, latest_defined, RsiIndicator};
use crate::params::{VolumeEmaParams, VOLUME_RSI_PERIOD};

/// Everything the decision functions read on one tick, computed once from
/// the candle window. Read-only once built, so evaluation is a pure
/// function of the snapshot and the hyperparameters.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSnapshot {
    /// Open time of the current candle.
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    /// Close of the current candle, used as the current price.
    pub close: f64,
    pub current_volume: f64,
    /// EMA of volume, one value per candle, `NaN` during warm-up.
    pub volume_ema: Vec<f64>,
    /// EMA of close, one value per candle, `NaN` during warm-up.
    pub trend_ema: Vec<f64>,
    /// RSI of volume. `None` while history is shorter than the RSI period.
    pub volume_rsi: Option<f64>,
    /// Percent change of the volume EMA over `growth_lookback` bars.
    pub volume_growth_percent: f64,
    /// Consecutive most-recent bars whose volume beat the volume EMA.
    pub consecutive_volume_bars: usize,
}

impl IndicatorSnapshot {
    pub fn compute(candles: &[Candle], params: &VolumeEmaParams) -> Option<Self> {
        let current = candles.last()?;

        let volumes: Vec<f64> = candles.iter().map(|c| c.volume).collect();
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();

        let volume_ema = ema_series(&volumes, params.ema_volume_length);
        let trend_ema = ema_series(&closes, params.ema_price_trend);
        let volume_rsi = RsiIndicator::new(VOLUME_RSI_PERIOD).compute(&volumes);

        Some(Self {
            timestamp: current.timestamp,
            open: current.open,
            close: current.close,
            current_volume: current.volume,
            volume_growth_percent: growth_percent(&volume_ema, params.growth_lookback),
            consecutive_volume_bars: consecutive_bars_above(&volumes, &volume_ema),
            volume_ema,
            trend_ema,
            volume_rsi,
        })
    }

    pub fn price(&self) -> f64 {
        self.close
    }

    /// `None` until the window covers `ema_volume_length` bars.
    pub fn latest_volume_ema(&self) -> Option<f64> {
        latest_defined(&self.volume_ema)
    }

    /// `None` until the window covers `ema_price_trend` bars.
    pub fn latest_trend_ema(&self) -> Option<f64> {
        latest_defined(&self.trend_ema)
    }

    /// Current volume as a multiple of the volume EMA.
    pub fn volume_multiple(&self) -> Option<f64> {
        self.latest_volume_ema()
            .filter(|&ema| ema != 0.0)
            .map(|ema| self.current_volume / ema)
    }
}

/// Percent change between `series[-1]` and `series[-lookback-1]`.
///
/// Returns 0.0 when the series is shorter than `lookback + 1`, when either
/// end is still undefined, or when the past value is zero. Callers compare
/// that 0.0 against their threshold like any other value.
pub fn growth_percent(series: &[f64], lookback: usize) -> f64 {
    let n = series.len();
    if n < lookback + 1 {
        return 0.0;
    }
    let current = series[n - 1];
    let past = series[n - 1 - lookback];
    if !current.is_finite() || !past.is_finite() || past == 0.0 {
        return 0.0;
    }
    (current - past) / past * 100.0
}

/// Walk back from the newest bar, counting bars where `values[i] > reference[i]`.
/// An undefined reference ends the run.
pub fn consecutive_bars_above(values: &[f64], reference: &[f64]) -> usize {
    values
        .iter()
        .zip(reference)
        .rev()
        .take_while(|(v, r)| v > r)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn candle(i: i64, open: f64, close: f64, volume: f64) -> Candle {
        Candle {
            timestamp: Utc.timestamp_opt(1_700_000_000 + i * 60, 0).unwrap(),
            open,
            high: open.max(close),
            low: open.min(close),
            close,
            volume,
        }
    }

    #[test]
    fn empty_window_has_no_snapshot() {
        assert!(IndicatorSnapshot::compute(&[], &VolumeEmaParams::default()).is_none());
    }

    #[test]
    fn growth_is_zero_with_insufficient_history() {
        for lookback in 2..=10 {
            let series: Vec<f64> = (0..lookback).map(|i| 100.0 + i as f64 * 50.0).collect();
            assert_eq!(growth_percent(&series, lookback), 0.0, "lookback {lookback}");
        }
    }

    #[test]
    fn growth_is_zero_when_past_value_is_zero() {
        assert_eq!(growth_percent(&[0.0, 5.0, 10.0], 2), 0.0);
    }

    #[test]
    fn growth_measures_percent_change_over_lookback() {
        let series = [100.0, 110.0, 120.0, 130.0];
        assert!((growth_percent(&series, 3) - 30.0).abs() < 1e-9);
        assert!((growth_percent(&series, 1) - (10.0 / 120.0 * 100.0)).abs() < 1e-9);
    }

    #[test]
    fn consecutive_count_stops_at_first_miss() {
        let volumes = [50.0, 200.0, 90.0, 150.0, 160.0];
        let ema = [100.0, 100.0, 100.0, 100.0, 100.0];
        assert_eq!(consecutive_bars_above(&volumes, &ema), 2);
    }

    #[test]
    fn growth_is_zero_while_series_warms_up() {
        let series = [f64::NAN, f64::NAN, 100.0, 120.0];
        assert_eq!(growth_percent(&series, 2), 0.0);
        assert_eq!(growth_percent(&series, 3), 0.0);
        assert!((growth_percent(&series, 1) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn consecutive_count_stops_at_undefined_reference() {
        let volumes = [500.0, 500.0, 500.0];
        let ema = [f64::NAN, 100.0, 100.0];
        assert_eq!(consecutive_bars_above(&volumes, &ema), 2);
    }

    #[test]
    fn consecutive_count_is_strict() {
        assert_eq!(consecutive_bars_above(&[100.0, 100.0], &[100.0, 100.0]), 0);
    }

    #[test]
    fn snapshot_reads_current_candle() {
        let mut candles: Vec<Candle> = (0..30).map(|i| candle(i, 100.0, 100.5, 1_000.0)).collect();
        candles.push(candle(30, 101.0, 104.0, 9_000.0));
        let params = VolumeEmaParams {
            ema_volume_length: 10,
            ema_price_trend: 10,
            ..VolumeEmaParams::default()
        };

        let snap = IndicatorSnapshot::compute(&candles, &params).unwrap();
        assert_eq!(snap.price(), 104.0);
        assert_eq!(snap.open, 101.0);
        assert_eq!(snap.current_volume, 9_000.0);
        assert_eq!(snap.volume_ema.len(), 31);
        assert_eq!(snap.trend_ema.len(), 31);
        assert!(snap.volume_rsi.is_some());
        assert_eq!(snap.consecutive_volume_bars, 1);
        assert!(snap.volume_growth_percent > 0.0);
        assert!(snap.volume_multiple().unwrap() > 1.0);
    }

    #[test]
    fn window_shorter_than_period_has_no_ema() {
        let candles: Vec<Candle> = (0..3).map(|i| candle(i, 100.0, 100.5, 500.0)).collect();
        let snap = IndicatorSnapshot::compute(&candles, &VolumeEmaParams::default()).unwrap();
        assert_eq!(snap.volume_ema.len(), 3);
        assert_eq!(snap.latest_volume_ema(), None);
        assert_eq!(snap.latest_trend_ema(), None);
        assert_eq!(snap.volume_multiple(), None);
        assert_eq!(snap.consecutive_volume_bars, 0);
    }

    #[test]
    fn short_window_has_no_volume_rsi() {
        let candles: Vec<Candle> = (0..5).map(|i| candle(i, 1.0, 1.0, 10.0)).collect();
        let snap = IndicatorSnapshot::compute(&candles, &VolumeEmaParams::default()).unwrap();
        assert!(snap.volume_rsi.is_none());
        assert_eq!(snap.volume_growth_percent, 0.0);
    }
}
