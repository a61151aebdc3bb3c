use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use common::{Error, Result};

/// Top-level strategy config file (TOML).
///
/// Example `config/strategies.toml`:
/// ```toml
/// [[strategy]]
/// type = "volume_ema"
/// name = "BTC volume spike"
/// pair = "BTCUSDT"
///
/// [strategy.params]
/// volume_multiplier = 10.0
/// use_volume_rsi = false
/// telegram_token = "123456:ABC"
/// telegram_chat_id = "987654"
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StrategyFileConfig {
    #[serde(rename = "strategy")]
    pub strategies: Vec<StrategyConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StrategyConfig {
    /// Strategy type identifier. Only "volume_ema" is known.
    #[serde(rename = "type")]
    pub strategy_type: String,
    /// Human-readable name shown in logs and notifications.
    pub name: String,
    /// Trading pair, e.g. "BTCUSDT".
    pub pair: String,
    /// Hyperparameters, validated by the strategy type.
    #[serde(default)]
    pub params: HashMap<String, toml::Value>,
}

impl StrategyFileConfig {
    /// Load from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("failed to read strategy config at '{path}': {e}"))
        })?;
        Self::parse(&content)
            .map_err(|e| Error::Config(format!("failed to parse strategy config at '{path}': {e}")))
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }
}
