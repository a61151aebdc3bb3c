pub mod config;
pub mod filters;
pub mod indicators;
pub mod message;
pub mod params;
pub mod position;
pub mod registry;
pub mod runner;
pub mod sizing;
pub mod snapshot;
pub mod volume_ema;

pub use config::{StrategyConfig, StrategyFileConfig};
pub use params::VolumeEmaParams;
pub use position::{EntryPlan, PositionSession, TrailingStop};
pub use registry::StrategyRegistry;
pub use runner::{RunnerState, StrategyRunner};
pub use snapshot::IndicatorSnapshot;
pub use volume_ema::VolumeEmaStrategy;

use common::{Account, Candle, ClosedPosition, Side};
use tracing::warn;

/// The callback contract a host-driven strategy implements.
///
/// `StrategyRunner` invokes these in a fixed order on every tick:
/// `prepare` once, then either the entry callbacks (when flat) or
/// `on_tick` (when a position is open). Lifecycle hooks fire when the
/// host reports a fill or a close.
pub trait Strategy: Send + Sync {
    /// Human-readable name of this strategy instance.
    fn name(&self) -> &str;

    /// The trading pair this strategy watches (e.g. "BTCUSDT").
    fn pair(&self) -> &str;

    /// Compute every indicator this tick needs, once.
    /// Returns `None` when the candle window is empty.
    fn prepare(&self, candles: &[Candle]) -> Option<IndicatorSnapshot>;

    fn should_enter_long(&self, snapshot: &IndicatorSnapshot) -> bool;

    fn should_enter_short(&self, snapshot: &IndicatorSnapshot) -> bool;

    /// Resolve the entry direction for this tick.
    ///
    /// This is the only place a direction is chosen. If both predicates
    /// hold at once the tick is treated as ambiguous and no entry is made.
    fn decide_entry(&self, snapshot: &IndicatorSnapshot) -> Option<Side> {
        match (
            self.should_enter_long(snapshot),
            self.should_enter_short(snapshot),
        ) {
            (true, false) => Some(Side::Long),
            (false, true) => Some(Side::Short),
            (false, false) => None,
            (true, true) => {
                warn!(pair = %self.pair(), "Long and short both signalled, skipping entry");
                None
            }
        }
    }

    /// Plan a long entry. `None` when the account cannot fund one.
    fn go_long(&self, snapshot: &IndicatorSnapshot, account: &Account) -> Option<EntryPlan>;

    /// Plan a short entry. `None` when the account cannot fund one.
    fn go_short(&self, snapshot: &IndicatorSnapshot, account: &Account) -> Option<EntryPlan>;

    /// Called every tick while a position is open.
    /// Returns a new stop-loss level when it should be moved.
    fn on_tick(&self, session: &mut PositionSession, snapshot: &IndicatorSnapshot) -> Option<f64>;

    fn on_position_opened(&self, session: &mut PositionSession);

    fn on_position_closed(&self, session: &mut PositionSession, closed: &ClosedPosition);
}
