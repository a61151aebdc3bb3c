use std::collections::HashMap;
use std::fmt::Display;

use serde::{Deserialize, Serialize};

use common::{Error, Result};

/// Period of the RSI computed over volume. Fixed, not a hyperparameter.
pub const VOLUME_RSI_PERIOD: usize = 14;

/// Typed hyperparameter set for the volume/EMA spike strategy.
/// Immutable for the lifetime of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeEmaParams {
    // EMA and volume
    pub ema_volume_length: usize,
    pub volume_multiplier: f64,
    pub ema_price_trend: usize,

    // Optional volume filters
    pub use_volume_growth: bool,
    pub min_growth_percent: f64,
    pub growth_lookback: usize,
    pub use_sustained_volume: bool,
    pub min_consecutive_bars: usize,
    pub use_volume_rsi: bool,
    pub min_volume_rsi: f64,

    // Risk management, percentages (4.0 = 4%)
    pub tp_percent: f64,
    pub sl_percent: f64,
    pub use_trailing_stop: bool,
    pub trail_activation: f64,
    pub trail_offset: f64,
    pub use_ema_sl: bool,

    // Telegram
    pub telegram_token: String,
    pub telegram_chat_id: String,
}

impl Default for VolumeEmaParams {
    fn default() -> Self {
        Self {
            ema_volume_length: 1400,
            volume_multiplier: 10.0,
            ema_price_trend: 1440,
            use_volume_growth: true,
            min_growth_percent: 15.0,
            growth_lookback: 5,
            use_sustained_volume: true,
            min_consecutive_bars: 2,
            use_volume_rsi: true,
            min_volume_rsi: 55.0,
            tp_percent: 4.0,
            sl_percent: 2.0,
            use_trailing_stop: true,
            trail_activation: 2.0,
            trail_offset: 1.0,
            use_ema_sl: true,
            telegram_token: String::new(),
            telegram_chat_id: String::new(),
        }
    }
}

/// Declared type, bounds and default of one hyperparameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamKind {
    Int { min: i64, max: i64, default: i64 },
    Float { min: f64, max: f64, default: f64 },
    Bool { default: bool },
    Str { default: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hyperparameter {
    pub name: &'static str,
    pub kind: ParamKind,
}

const fn int(name: &'static str, min: i64, max: i64, default: i64) -> Hyperparameter {
    Hyperparameter { name, kind: ParamKind::Int { min, max, default } }
}

const fn float(name: &'static str, min: f64, max: f64, default: f64) -> Hyperparameter {
    Hyperparameter { name, kind: ParamKind::Float { min, max, default } }
}

const fn flag(name: &'static str, default: bool) -> Hyperparameter {
    Hyperparameter { name, kind: ParamKind::Bool { default } }
}

const fn text(name: &'static str, default: &'static str) -> Hyperparameter {
    Hyperparameter { name, kind: ParamKind::Str { default } }
}

/// Every accepted hyperparameter with its range. Also the search space an
/// optimizer would sweep.
pub const HYPERPARAMETERS: &[Hyperparameter] = &[
    int("ema_volume_length", 1000, 2000, 1400),
    float("volume_multiplier", 5.0, 20.0, 10.0),
    int("ema_price_trend", 1000, 2000, 1440),
    flag("use_volume_growth", true),
    float("min_growth_percent", 5.0, 30.0, 15.0),
    int("growth_lookback", 2, 10, 5),
    flag("use_sustained_volume", true),
    int("min_consecutive_bars", 1, 5, 2),
    flag("use_volume_rsi", true),
    int("min_volume_rsi", 40, 70, 55),
    float("tp_percent", 1.0, 10.0, 4.0),
    float("sl_percent", 0.5, 5.0, 2.0),
    flag("use_trailing_stop", true),
    float("trail_activation", 1.0, 5.0, 2.0),
    float("trail_offset", 0.5, 3.0, 1.0),
    flag("use_ema_sl", true),
    text("telegram_token", ""),
    text("telegram_chat_id", ""),
];

impl VolumeEmaParams {
    /// Build from a `[strategy.params]` table.
    ///
    /// Missing keys take their defaults. Unknown keys, wrong types and
    /// out-of-range values are configuration errors.
    pub fn from_params(params: &HashMap<String, toml::Value>) -> Result<Self> {
        if let Some(unknown) = params
            .keys()
            .find(|k| !HYPERPARAMETERS.iter().any(|h| h.name == k.as_str()))
        {
            return Err(Error::Config(format!("unknown hyperparameter '{unknown}'")));
        }

        Ok(Self {
            ema_volume_length: param_int(params, "ema_volume_length")? as usize,
            volume_multiplier: param_float(params, "volume_multiplier")?,
            ema_price_trend: param_int(params, "ema_price_trend")? as usize,
            use_volume_growth: param_bool(params, "use_volume_growth")?,
            min_growth_percent: param_float(params, "min_growth_percent")?,
            growth_lookback: param_int(params, "growth_lookback")? as usize,
            use_sustained_volume: param_bool(params, "use_sustained_volume")?,
            min_consecutive_bars: param_int(params, "min_consecutive_bars")? as usize,
            use_volume_rsi: param_bool(params, "use_volume_rsi")?,
            min_volume_rsi: param_int(params, "min_volume_rsi")? as f64,
            tp_percent: param_float(params, "tp_percent")?,
            sl_percent: param_float(params, "sl_percent")?,
            use_trailing_stop: param_bool(params, "use_trailing_stop")?,
            trail_activation: param_float(params, "trail_activation")?,
            trail_offset: param_float(params, "trail_offset")?,
            use_ema_sl: param_bool(params, "use_ema_sl")?,
            telegram_token: param_str(params, "telegram_token")?,
            telegram_chat_id: param_str(params, "telegram_chat_id")?,
        })
    }

    /// Token and chat id, when both are set.
    pub fn telegram_credentials(&self) -> Option<(&str, &str)> {
        let token = self.telegram_token.trim();
        let chat_id = self.telegram_chat_id.trim();
        if token.is_empty() || chat_id.is_empty() {
            None
        } else {
            Some((token, chat_id))
        }
    }
}

fn declared(name: &str) -> Result<ParamKind> {
    HYPERPARAMETERS
        .iter()
        .find(|h| h.name == name)
        .map(|h| h.kind)
        .ok_or_else(|| Error::Other(format!("hyperparameter '{name}' is not declared")))
}

fn type_error(name: &str, expected: &str, got: &toml::Value) -> Error {
    Error::Config(format!(
        "hyperparameter '{name}' must be {expected}, got {}",
        got.type_str()
    ))
}

fn range_error<T: Display>(name: &str, value: T, min: T, max: T) -> Error {
    Error::Config(format!("hyperparameter '{name}' = {value} is outside [{min}, {max}]"))
}

fn param_int(params: &HashMap<String, toml::Value>, name: &str) -> Result<i64> {
    let ParamKind::Int { min, max, default } = declared(name)? else {
        return Err(Error::Other(format!("'{name}' is not an integer hyperparameter")));
    };
    let value = match params.get(name) {
        None => default,
        Some(v) => v.as_integer().ok_or_else(|| type_error(name, "an integer", v))?,
    };
    if !(min..=max).contains(&value) {
        return Err(range_error(name, value, min, max));
    }
    Ok(value)
}

/// Accepts integers too, so `tp_percent = 4` reads as 4.0.
fn param_float(params: &HashMap<String, toml::Value>, name: &str) -> Result<f64> {
    let ParamKind::Float { min, max, default } = declared(name)? else {
        return Err(Error::Other(format!("'{name}' is not a float hyperparameter")));
    };
    let value = match params.get(name) {
        None => default,
        Some(v) => v
            .as_float()
            .or_else(|| v.as_integer().map(|i| i as f64))
            .ok_or_else(|| type_error(name, "a number", v))?,
    };
    if !(min..=max).contains(&value) {
        return Err(range_error(name, value, min, max));
    }
    Ok(value)
}

fn param_bool(params: &HashMap<String, toml::Value>, name: &str) -> Result<bool> {
    let ParamKind::Bool { default } = declared(name)? else {
        return Err(Error::Other(format!("'{name}' is not a boolean hyperparameter")));
    };
    match params.get(name) {
        None => Ok(default),
        Some(v) => v.as_bool().ok_or_else(|| type_error(name, "a boolean", v)),
    }
}

fn param_str(params: &HashMap<String, toml::Value>, name: &str) -> Result<String> {
    let ParamKind::Str { default } = declared(name)? else {
        return Err(Error::Other(format!("'{name}' is not a string hyperparameter")));
    };
    match params.get(name) {
        None => Ok(default.to_string()),
        Some(v) => v
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| type_error(name, "a string", v)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(src: &str) -> HashMap<String, toml::Value> {
        toml::from_str(src).unwrap()
    }

    #[test]
    fn empty_table_yields_declared_defaults() {
        let params = VolumeEmaParams::from_params(&HashMap::new()).unwrap();
        assert_eq!(params, VolumeEmaParams::default());
    }

    #[test]
    fn overrides_are_applied() {
        let params = VolumeEmaParams::from_params(&table(
            r#"
            volume_multiplier = 12.5
            growth_lookback = 3
            use_volume_rsi = false
            telegram_chat_id = "42"
            "#,
        ))
        .unwrap();
        assert_eq!(params.volume_multiplier, 12.5);
        assert_eq!(params.growth_lookback, 3);
        assert!(!params.use_volume_rsi);
        assert_eq!(params.telegram_chat_id, "42");
        assert_eq!(params.ema_volume_length, 1400);
    }

    #[test]
    fn integer_literal_accepted_for_float_param() {
        let params = VolumeEmaParams::from_params(&table("tp_percent = 4")).unwrap();
        assert_eq!(params.tp_percent, 4.0);
    }

    #[test]
    fn out_of_range_value_is_rejected() {
        let err = VolumeEmaParams::from_params(&table("volume_multiplier = 25.0")).unwrap_err();
        assert!(matches!(err, Error::Config(ref m) if m.contains("volume_multiplier")), "{err}");

        let err = VolumeEmaParams::from_params(&table("growth_lookback = 1")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn wrong_type_is_rejected() {
        let err = VolumeEmaParams::from_params(&table("use_ema_sl = \"yes\"")).unwrap_err();
        assert!(matches!(err, Error::Config(ref m) if m.contains("boolean")), "{err}");

        let err = VolumeEmaParams::from_params(&table("ema_volume_length = 1400.5")).unwrap_err();
        assert!(matches!(err, Error::Config(ref m) if m.contains("integer")), "{err}");
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = VolumeEmaParams::from_params(&table("volume_multipler = 10.0")).unwrap_err();
        assert!(matches!(err, Error::Config(ref m) if m.contains("volume_multipler")), "{err}");
    }

    #[test]
    fn credentials_require_both_values() {
        let mut params = VolumeEmaParams::default();
        assert!(params.telegram_credentials().is_none());

        params.telegram_token = "123:abc".into();
        assert!(params.telegram_credentials().is_none());

        params.telegram_chat_id = " 42 ".into();
        assert_eq!(params.telegram_credentials(), Some(("123:abc", "42")));
    }

    #[test]
    fn every_declared_default_lies_in_its_range() {
        for h in HYPERPARAMETERS {
            match h.kind {
                ParamKind::Int { min, max, default } => {
                    assert!((min..=max).contains(&default), "{}", h.name)
                }
                ParamKind::Float { min, max, default } => {
                    assert!((min..=max).contains(&default), "{}", h.name)
                }
                ParamKind::Bool { .. } | ParamKind::Str { .. } => {}
            }
        }
    }
}
