pub mod ema;
pub mod rsi;

pub use ema::{ema_series, latest_defined};
pub use rsi::RsiIndicator;
