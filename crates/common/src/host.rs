use crate::{Account, Candle, Instruction};

/// The contract a host trading framework exposes to a strategy.
///
/// The host owns candle storage, order execution and position bookkeeping.
/// A strategy only reads from it and hands back `Instruction`s; it never
/// mutates position state directly. Position open/close events travel the
/// other way, from the host into `StrategyRunner`.
pub trait Host {
    /// Trading pair the host is currently feeding (e.g. "BTCUSDT").
    fn symbol(&self) -> &str;

    /// Closed candles, oldest first. The last element is the current bar.
    fn candles(&self) -> &[Candle];

    /// Capital available for the next entry.
    fn account(&self) -> Account;

    /// Apply an entry, take-profit or stop-loss instruction.
    fn submit(&mut self, instruction: Instruction);
}
