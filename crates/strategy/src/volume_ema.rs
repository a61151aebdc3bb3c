use tracing::{debug, info, warn};

use common::{Account, Candle, ClosedPosition, Notifier, Side};

use crate::filters::FilterReport;
use crate::message::{close_message, entry_message};
use crate::params::VolumeEmaParams;
use crate::position::{trail_candidate, EntryPlan, PositionSession};
use crate::sizing::size_to_qty;
use crate::snapshot::IndicatorSnapshot;
use crate::Strategy;

/// Enters on a volume spike in the direction of the candle and the trend
/// EMA, then manages a single position with fixed take-profit and an
/// optional ratcheting stop.
pub struct VolumeEmaStrategy {
    name: String,
    pair: String,
    params: VolumeEmaParams,
    notifier: Option<Box<dyn Notifier>>,
}

impl VolumeEmaStrategy {
    pub fn new(name: impl Into<String>, pair: impl Into<String>, params: VolumeEmaParams) -> Self {
        Self {
            name: name.into(),
            pair: pair.into(),
            params,
            notifier: None,
        }
    }

    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    fn check(&self, side: Side, snapshot: &IndicatorSnapshot) -> bool {
        let report = FilterReport::evaluate(side, snapshot, &self.params);
        debug!(
            pair = %self.pair,
            side = %side,
            directional = report.directional,
            trend = report.trend,
            volume_spike = report.volume_spike,
            growth = report.growth,
            sustained = report.sustained,
            volume_rsi = report.volume_rsi,
            "Entry filters evaluated"
        );
        report.passed()
    }

    fn enter(
        &self,
        side: Side,
        snapshot: &IndicatorSnapshot,
        account: &Account,
    ) -> Option<EntryPlan> {
        let price = snapshot.price();
        let quantity = size_to_qty(account.available_margin, price, account.fee_rate);
        if quantity <= 0.0 {
            warn!(
                pair = %self.pair,
                side = %side,
                margin = account.available_margin,
                price,
                "Available margin too small for an entry, skipping"
            );
            return None;
        }

        let sign = side.sign();
        let take_profit = price * (1.0 + sign * self.params.tp_percent / 100.0);
        let stop_loss = if self.params.use_ema_sl {
            let Some(ema) = snapshot.latest_trend_ema() else {
                warn!(
                    pair = %self.pair,
                    side = %side,
                    "Trend EMA still warming up, no stop level"
                );
                return None;
            };
            ema
        } else {
            price * (1.0 - sign * self.params.sl_percent / 100.0)
        };

        let plan = EntryPlan {
            side,
            quantity,
            entry_price: price,
            take_profit,
            stop_loss,
        };
        info!(
            pair = %self.pair,
            side = %side,
            qty = quantity,
            price,
            take_profit,
            stop_loss,
            "Entry planned"
        );

        self.notify(|| entry_message(&self.pair, &plan, snapshot));
        Some(plan)
    }

    /// Best-effort delivery. Failures are logged and dropped so they can
    /// never reach the decision path.
    fn notify(&self, message: impl FnOnce() -> String) {
        let Some(notifier) = &self.notifier else {
            return;
        };
        if let Err(e) = notifier.send(&message()) {
            warn!(pair = %self.pair, error = %e, "Telegram notification failed");
        }
    }
}

impl Strategy for VolumeEmaStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn pair(&self) -> &str {
        &self.pair
    }

    fn prepare(&self, candles: &[Candle]) -> Option<IndicatorSnapshot> {
        IndicatorSnapshot::compute(candles, &self.params)
    }

    fn should_enter_long(&self, snapshot: &IndicatorSnapshot) -> bool {
        self.check(Side::Long, snapshot)
    }

    fn should_enter_short(&self, snapshot: &IndicatorSnapshot) -> bool {
        self.check(Side::Short, snapshot)
    }

    fn go_long(&self, snapshot: &IndicatorSnapshot, account: &Account) -> Option<EntryPlan> {
        self.enter(Side::Long, snapshot, account)
    }

    fn go_short(&self, snapshot: &IndicatorSnapshot, account: &Account) -> Option<EntryPlan> {
        self.enter(Side::Short, snapshot, account)
    }

    fn on_tick(&self, session: &mut PositionSession, snapshot: &IndicatorSnapshot) -> Option<f64> {
        if !self.params.use_trailing_stop {
            return None;
        }

        let candidate = trail_candidate(
            session.side,
            session.entry_price,
            snapshot.price(),
            self.params.trail_activation,
            self.params.trail_offset,
        )?;

        let previous = session.stop_loss();
        if !session.stop_mut().tighten(candidate) {
            return None;
        }
        info!(
            pair = %self.pair,
            side = %session.side,
            from = previous,
            to = candidate,
            "Trailing stop tightened"
        );
        Some(candidate)
    }

    fn on_position_opened(&self, session: &mut PositionSession) {
        session.reset_notifications();
        info!(
            pair = %self.pair,
            side = %session.side,
            entry = session.entry_price,
            qty = session.quantity,
            "Position opened"
        );
    }

    fn on_position_closed(&self, session: &mut PositionSession, closed: &ClosedPosition) {
        info!(
            pair = %self.pair,
            side = %session.side,
            exit = closed.exit_price,
            pnl = closed.pnl,
            pnl_pct = closed.pnl_percentage,
            "Position closed"
        );
        if self.notifier.is_none() || !session.claim_close_notification() {
            return;
        }
        self.notify(|| close_message(&self.pair, closed));
    }
}
