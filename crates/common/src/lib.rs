pub mod config;
pub mod error;
pub mod host;
pub mod notify;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use host::Host;
pub use notify::Notifier;
pub use types::*;
