use tracing::{info, warn};

use common::{ClosedPosition, Fill, Host, Instruction, Side};

use crate::position::{EntryPlan, PositionSession};
use crate::Strategy;

/// Where a runner is in the position lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub enum RunnerState {
    /// No position; entries are evaluated every tick.
    Flat,
    /// Entry instructions submitted, waiting for the host to confirm a fill.
    Pending(EntryPlan),
    /// Position open; the stop is managed every tick.
    Open(PositionSession),
}

/// Drives one strategy through FLAT → PENDING → OPEN → FLAT.
///
/// The host calls `on_candle` once per closed candle and reports fills and
/// closes through `on_position_opened` / `on_position_closed`. A runner
/// holds at most one position at a time.
pub struct StrategyRunner {
    strategy: Box<dyn Strategy>,
    state: RunnerState,
}

impl StrategyRunner {
    pub fn new(strategy: Box<dyn Strategy>) -> Self {
        Self {
            strategy,
            state: RunnerState::Flat,
        }
    }

    pub fn strategy(&self) -> &dyn Strategy {
        self.strategy.as_ref()
    }

    pub fn state(&self) -> &RunnerState {
        &self.state
    }

    /// Process the host's newest candle.
    pub fn on_candle(&mut self, host: &mut dyn Host) {
        let Some(snapshot) = self.strategy.prepare(host.candles()) else {
            return;
        };

        if let RunnerState::Open(session) = &mut self.state {
            if let Some(level) = self.strategy.on_tick(session, &snapshot) {
                host.submit(Instruction::StopLoss {
                    quantity: session.quantity,
                    price: level,
                });
            }
            return;
        }

        if !matches!(self.state, RunnerState::Flat) {
            return;
        }

        let Some(side) = self.strategy.decide_entry(&snapshot) else {
            return;
        };
        let account = host.account();
        let plan = match side {
            Side::Long => self.strategy.go_long(&snapshot, &account),
            Side::Short => self.strategy.go_short(&snapshot, &account),
        };
        let Some(plan) = plan else {
            return;
        };

        for instruction in plan.instructions() {
            host.submit(instruction);
        }
        self.state = RunnerState::Pending(plan);
    }

    /// The host filled the pending entry.
    pub fn on_position_opened(&mut self, fill: &Fill) {
        match std::mem::replace(&mut self.state, RunnerState::Flat) {
            RunnerState::Pending(plan) if plan.side == fill.side => {
                let mut session = PositionSession::open(&plan, fill);
                self.strategy.on_position_opened(&mut session);
                self.state = RunnerState::Open(session);
            }
            other => {
                warn!(
                    pair = %fill.pair,
                    side = %fill.side,
                    state = ?other,
                    "Fill does not match a pending entry, ignoring"
                );
                self.state = other;
            }
        }
    }

    /// The host closed the open position.
    pub fn on_position_closed(&mut self, closed: &ClosedPosition) {
        match std::mem::replace(&mut self.state, RunnerState::Flat) {
            RunnerState::Open(mut session) => {
                self.strategy.on_position_closed(&mut session, closed);
            }
            RunnerState::Pending(plan) => {
                warn!(
                    pair = %closed.pair,
                    side = %plan.side,
                    "Close reported before fill, dropping pending entry"
                );
            }
            RunnerState::Flat => {
                warn!(pair = %closed.pair, "Close reported with no open position, ignoring");
            }
        }
    }

    /// The host cancelled the pending entry without filling it.
    pub fn on_entry_cancelled(&mut self) {
        if let RunnerState::Pending(plan) = &self.state {
            info!(pair = %self.strategy.pair(), side = %plan.side, "Pending entry cancelled");
            self.state = RunnerState::Flat;
        }
    }
}
