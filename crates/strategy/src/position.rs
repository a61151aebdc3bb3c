use chrono::{DateTime, Utc};

use common::{Fill, Instruction, Side};

/// The instructions proposed for one entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntryPlan {
    pub side: Side,
    pub quantity: f64,
    pub entry_price: f64,
    pub take_profit: f64,
    pub stop_loss: f64,
}

impl EntryPlan {
    /// Entry, take-profit and stop-loss, in the order the host should apply them.
    pub fn instructions(&self) -> [Instruction; 3] {
        [
            Instruction::Entry {
                side: self.side.entry_order_side(),
                quantity: self.quantity,
                price: self.entry_price,
            },
            Instruction::TakeProfit {
                quantity: self.quantity,
                price: self.take_profit,
            },
            Instruction::StopLoss {
                quantity: self.quantity,
                price: self.stop_loss,
            },
        ]
    }
}

/// Stop-loss level that may tighten but never loosen.
///
/// Long stops only move up, short stops only move down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailingStop {
    side: Side,
    level: f64,
}

impl TrailingStop {
    pub fn new(side: Side, level: f64) -> Self {
        Self { side, level }
    }

    pub fn level(&self) -> f64 {
        self.level
    }

    /// Move to `candidate` only if it is strictly more favorable.
    /// Returns whether the level changed.
    pub fn tighten(&mut self, candidate: f64) -> bool {
        let better = match self.side {
            Side::Long => candidate > self.level,
            Side::Short => candidate < self.level,
        };
        if better {
            self.level = candidate;
        }
        better
    }
}

/// Candidate trailing stop for the current price, or `None` while the
/// position has not yet moved `activation_pct` in its favor.
pub fn trail_candidate(
    side: Side,
    entry_price: f64,
    price: f64,
    activation_pct: f64,
    offset_pct: f64,
) -> Option<f64> {
    match side {
        Side::Long => {
            let activation = entry_price * (1.0 + activation_pct / 100.0);
            (price >= activation).then(|| price * (1.0 - offset_pct / 100.0))
        }
        Side::Short => {
            let activation = entry_price * (1.0 - activation_pct / 100.0);
            (price <= activation).then(|| price * (1.0 + offset_pct / 100.0))
        }
    }
}

/// Strategy-side state for one open position, created when the host
/// confirms the entry fill and dropped when it reports the close.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionSession {
    pub side: Side,
    pub entry_price: f64,
    pub quantity: f64,
    pub take_profit: f64,
    pub opened_at: DateTime<Utc>,
    stop: TrailingStop,
    close_notified: bool,
}

impl PositionSession {
    /// Levels come from the plan; price and quantity from the actual fill.
    pub fn open(plan: &EntryPlan, fill: &Fill) -> Self {
        Self {
            side: fill.side,
            entry_price: fill.entry_price,
            quantity: fill.quantity,
            take_profit: plan.take_profit,
            opened_at: fill.timestamp,
            stop: TrailingStop::new(fill.side, plan.stop_loss),
            close_notified: false,
        }
    }

    pub fn stop_loss(&self) -> f64 {
        self.stop.level()
    }

    pub fn stop_mut(&mut self) -> &mut TrailingStop {
        &mut self.stop
    }

    pub fn reset_notifications(&mut self) {
        self.close_notified = false;
    }

    /// Claim the close notification. True the first time only.
    pub fn claim_close_notification(&mut self) -> bool {
        !std::mem::replace(&mut self.close_notified, true)
    }
}
