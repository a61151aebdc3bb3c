pub mod notifier;

pub use notifier::{TelegramNotifier, PARSE_MODE};
