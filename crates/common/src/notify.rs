use crate::Result;

/// Outbound notification channel for position events.
///
/// Delivery is best-effort. Callers in the decision path log and drop any
/// error; implementations must bound their own latency.
pub trait Notifier: Send + Sync {
    fn send(&self, text: &str) -> Result<()>;
}
