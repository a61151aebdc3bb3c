use std::time::Duration;

use tracing::warn;

/// Runtime configuration loaded from environment variables.
/// Every variable is optional; strategy hyperparameters live in the
/// strategy file, not here.
#[derive(Debug, Clone)]
pub struct Config {
    // Strategy config file path
    pub strategy_config_path: String,

    // Telegram delivery
    pub telegram_api_base: String,
    pub telegram_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            strategy_config_path: DEFAULT_STRATEGY_CONFIG_PATH.to_string(),
            telegram_api_base: DEFAULT_TELEGRAM_API_BASE.to_string(),
            telegram_timeout: Duration::from_secs(DEFAULT_TELEGRAM_TIMEOUT_SECS),
        }
    }
}

pub const DEFAULT_STRATEGY_CONFIG_PATH: &str = "config/strategies.toml";
pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";
pub const DEFAULT_TELEGRAM_TIMEOUT_SECS: u64 = 5;

impl Config {
    /// Load configuration from environment variables.
    /// Loads `.env` if present. Unparseable values fall back to defaults.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // ignore error if .env not present

        Config {
            strategy_config_path: optional_env("STRATEGY_CONFIG_PATH")
                .unwrap_or_else(|| DEFAULT_STRATEGY_CONFIG_PATH.to_string()),
            telegram_api_base: optional_env("TELEGRAM_API_BASE")
                .map(|base| base.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_TELEGRAM_API_BASE.to_string()),
            telegram_timeout: telegram_timeout(optional_env("TELEGRAM_TIMEOUT_SECS")),
        }
    }
}

/// Whole seconds; anything else falls back to the default with a warning.
fn telegram_timeout(raw: Option<String>) -> Duration {
    let secs = match raw {
        Some(raw) => raw.trim().parse::<u64>().unwrap_or_else(|_| {
            warn!(
                value = %raw,
                "TELEGRAM_TIMEOUT_SECS is not a whole number of seconds, using default"
            );
            DEFAULT_TELEGRAM_TIMEOUT_SECS
        }),
        None => DEFAULT_TELEGRAM_TIMEOUT_SECS,
    };
    Duration::from_secs(secs)
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
