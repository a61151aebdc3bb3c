use common::Side;

use crate::params::VolumeEmaParams;
use crate::snapshot::IndicatorSnapshot;

/// True iff `current_volume > multiplier × volume_ema`. Equality is not a spike.
pub fn volume_spike(current_volume: f64, volume_ema: f64, multiplier: f64) -> bool {
    current_volume > volume_ema * multiplier
}

pub fn check_volume_growth(params: &VolumeEmaParams, growth_percent: f64) -> bool {
    if !params.use_volume_growth {
        return true;
    }
    growth_percent >= params.min_growth_percent
}

pub fn check_sustained_volume(params: &VolumeEmaParams, consecutive_bars: usize) -> bool {
    if !params.use_sustained_volume {
        return true;
    }
    consecutive_bars >= params.min_consecutive_bars
}

/// A missing RSI (not enough history) never passes an enabled filter.
pub fn check_volume_rsi(params: &VolumeEmaParams, volume_rsi: Option<f64>) -> bool {
    if !params.use_volume_rsi {
        return true;
    }
    volume_rsi.is_some_and(|rsi| rsi >= params.min_volume_rsi)
}

/// Outcome of every entry filter for one side on one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterReport {
    /// Candle body points the right way.
    pub directional: bool,
    /// Close is on the right side of the trend EMA. False while the EMA
    /// is still warming up.
    pub trend: bool,
    /// False while the volume EMA is still warming up.
    pub volume_spike: bool,
    pub growth: bool,
    pub sustained: bool,
    pub volume_rsi: bool,
}

impl FilterReport {
    pub fn evaluate(side: Side, snapshot: &IndicatorSnapshot, params: &VolumeEmaParams) -> Self {
        let close = snapshot.close;
        let trend_ema = snapshot.latest_trend_ema();
        let (directional, trend) = match side {
            Side::Long => (close > snapshot.open, trend_ema.is_some_and(|ema| close > ema)),
            Side::Short => (close < snapshot.open, trend_ema.is_some_and(|ema| close < ema)),
        };

        Self {
            directional,
            trend,
            volume_spike: snapshot.latest_volume_ema().is_some_and(|ema| {
                volume_spike(snapshot.current_volume, ema, params.volume_multiplier)
            }),
            growth: check_volume_growth(params, snapshot.volume_growth_percent),
            sustained: check_sustained_volume(params, snapshot.consecutive_volume_bars),
            volume_rsi: check_volume_rsi(params, snapshot.volume_rsi),
        }
    }

    pub fn passed(&self) -> bool {
        self.directional
            && self.trend
            && self.volume_spike
            && self.growth
            && self.sustained
            && self.volume_rsi
    }
}
