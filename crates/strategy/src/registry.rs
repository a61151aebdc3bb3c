use std::collections::HashSet;

use tracing::info;

use common::{ClosedPosition, Config, Error, Fill, Host, Result};
use telegram_notify::TelegramNotifier;

use crate::config::{StrategyConfig, StrategyFileConfig};
use crate::params::VolumeEmaParams;
use crate::runner::StrategyRunner;
use crate::volume_ema::VolumeEmaStrategy;
use crate::Strategy;

/// Holds one runner per configured strategy and routes host events to the
/// runner watching the event's pair.
pub struct StrategyRegistry {
    runners: Vec<StrategyRunner>,
}

impl StrategyRegistry {
    /// Load `Config` from the environment and build from its strategy file.
    pub fn from_env() -> Result<Self> {
        let cfg = Config::from_env();
        let file_cfg = StrategyFileConfig::load(&cfg.strategy_config_path)?;
        Self::from_config(&file_cfg, &cfg)
    }

    /// Build the registry from config. Unknown strategy types, invalid
    /// hyperparameters and two strategies on one pair are errors.
    pub fn from_config(file_cfg: &StrategyFileConfig, cfg: &Config) -> Result<Self> {
        let mut pairs = HashSet::new();
        let mut runners = Vec::with_capacity(file_cfg.strategies.len());

        for strategy_cfg in &file_cfg.strategies {
            if !pairs.insert(strategy_cfg.pair.clone()) {
                return Err(Error::Config(format!(
                    "pair '{}' is configured more than once; one position per pair",
                    strategy_cfg.pair
                )));
            }
            let strategy = build_strategy(strategy_cfg, cfg)?;
            info!(name = %strategy.name(), pair = %strategy.pair(), "Registered strategy");
            runners.push(StrategyRunner::new(strategy));
        }

        Ok(Self { runners })
    }

    pub fn runners(&self) -> &[StrategyRunner] {
        &self.runners
    }

    pub fn runner(&self, pair: &str) -> Option<&StrategyRunner> {
        self.runners.iter().find(|r| r.strategy().pair() == pair)
    }

    fn runner_mut(&mut self, pair: &str) -> Option<&mut StrategyRunner> {
        self.runners.iter_mut().find(|r| r.strategy().pair() == pair)
    }

    /// Process the host's newest candle for its current symbol.
    pub fn process(&mut self, host: &mut dyn Host) {
        let symbol = host.symbol().to_string();
        if let Some(runner) = self.runner_mut(&symbol) {
            runner.on_candle(host);
        }
    }

    pub fn position_opened(&mut self, fill: &Fill) {
        if let Some(runner) = self.runner_mut(&fill.pair) {
            runner.on_position_opened(fill);
        }
    }

    pub fn position_closed(&mut self, closed: &ClosedPosition) {
        if let Some(runner) = self.runner_mut(&closed.pair) {
            runner.on_position_closed(closed);
        }
    }

    pub fn entry_cancelled(&mut self, pair: &str) {
        if let Some(runner) = self.runner_mut(pair) {
            runner.on_entry_cancelled();
        }
    }
}

// ─── Strategy builders ────────────────────────────────────────────────────────

fn build_strategy(strategy_cfg: &StrategyConfig, cfg: &Config) -> Result<Box<dyn Strategy>> {
    match strategy_cfg.strategy_type.as_str() {
        "volume_ema" => {
            let params = VolumeEmaParams::from_params(&strategy_cfg.params).map_err(|e| {
                Error::Config(format!("strategy '{}': {e}", strategy_cfg.name))
            })?;

            let notifier = match params.telegram_credentials() {
                Some((token, chat_id)) => Some(TelegramNotifier::from_config(token, chat_id, cfg)?),
                None => None,
            };

            let mut strategy =
                VolumeEmaStrategy::new(&strategy_cfg.name, &strategy_cfg.pair, params);
            if let Some(notifier) = notifier {
                info!(
                    name = %strategy_cfg.name,
                    chat_id = %notifier.chat_id(),
                    "Telegram notifications enabled"
                );
                strategy = strategy.with_notifier(Box::new(notifier));
            }
            Ok(Box::new(strategy))
        }
        other => Err(Error::Config(format!(
            "strategy '{}' has unknown type '{other}'",
            strategy_cfg.name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(src: &str) -> StrategyFileConfig {
        StrategyFileConfig::parse(src).unwrap()
    }

    #[test]
    fn builds_one_runner_per_strategy() {
        let registry = StrategyRegistry::from_config(
            &file(
                r#"
                [[strategy]]
                type = "volume_ema"
                name = "BTC"
                pair = "BTCUSDT"

                [[strategy]]
                type = "volume_ema"
                name = "ETH"
                pair = "ETHUSDT"
                [strategy.params]
                volume_multiplier = 8.0
                "#,
            ),
            &Config::default(),
        )
        .unwrap();

        assert_eq!(registry.runners().len(), 2);
        assert_eq!(registry.runner("ETHUSDT").unwrap().strategy().name(), "ETH");
        assert!(registry.runner("SOLUSDT").is_none());
    }

    #[test]
    fn unknown_type_is_rejected() {
        let err = StrategyRegistry::from_config(
            &file(
                r#"
                [[strategy]]
                type = "macd"
                name = "old"
                pair = "BTCUSDT"
                "#,
            ),
            &Config::default(),
        )
        .err()
        .unwrap();
        assert!(matches!(err, Error::Config(ref m) if m.contains("macd")), "{err}");
    }

    #[test]
    fn invalid_params_name_the_strategy() {
        let err = StrategyRegistry::from_config(
            &file(
                r#"
                [[strategy]]
                type = "volume_ema"
                name = "BTC spike"
                pair = "BTCUSDT"
                [strategy.params]
                tp_percent = 50.0
                "#,
            ),
            &Config::default(),
        )
        .err()
        .unwrap();
        assert!(matches!(err, Error::Config(_)), "{err}");
        let msg = err.to_string();
        assert!(msg.contains("BTC spike") && msg.contains("tp_percent"), "{msg}");
    }

    #[test]
    fn duplicate_pair_is_rejected() {
        let result = StrategyRegistry::from_config(
            &file(
                r#"
                [[strategy]]
                type = "volume_ema"
                name = "a"
                pair = "BTCUSDT"

                [[strategy]]
                type = "volume_ema"
                name = "b"
                pair = "BTCUSDT"
                "#,
            ),
            &Config::default(),
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
