use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

use common::{Config, Error, Notifier, Result};

/// Messages are formatted for Telegram's HTML parse mode.
pub const PARSE_MODE: &str = "HTML";

/// Sends messages to one chat through the Bot API `sendMessage` method.
///
/// Each call is a single blocking POST bounded by the client timeout.
/// There are no retries; callers decide what to do with an error.
pub struct TelegramNotifier {
    http: Client,
    /// Full `sendMessage` URL. Contains the bot token, never log it.
    url: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(
        token: &str,
        chat_id: impl Into<String>,
        api_base: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .use_rustls_tls()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http(e.without_url().to_string()))?;

        Ok(Self {
            http,
            url: format!("{}/bot{token}/sendMessage", api_base.trim_end_matches('/')),
            chat_id: chat_id.into(),
        })
    }

    /// Build a notifier using the API base and timeout from `Config`.
    pub fn from_config(token: &str, chat_id: impl Into<String>, cfg: &Config) -> Result<Self> {
        Self::new(token, chat_id, &cfg.telegram_api_base, cfg.telegram_timeout)
    }

    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }
}

impl std::fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("chat_id", &self.chat_id)
            .finish_non_exhaustive()
    }
}

impl Notifier for TelegramNotifier {
    fn send(&self, text: &str) -> Result<()> {
        let form = [
            ("chat_id", self.chat_id.as_str()),
            ("text", text),
            ("parse_mode", PARSE_MODE),
        ];

        debug!(chat_id = %self.chat_id, len = text.len(), "Sending Telegram message");
        let resp = self
            .http
            .post(&self.url)
            .form(&form)
            .send()
            .map_err(|e| Error::Http(e.without_url().to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .map_err(|e| Error::Http(e.without_url().to_string()))?;

        if !status.is_success() {
            return Err(Error::Telegram(format!(
                "HTTP {status}: {}",
                describe(&body)
            )));
        }

        let parsed: ApiResponse = serde_json::from_str(&body)?;
        if !parsed.ok {
            return Err(Error::Telegram(
                parsed
                    .description
                    .unwrap_or_else(|| "request rejected".to_string()),
            ));
        }
        Ok(())
    }
}

/// Prefer the API's own `description` over the raw body.
fn describe(body: &str) -> String {
    serde_json::from_str::<ApiResponse>(body)
        .ok()
        .and_then(|r| r.description)
        .unwrap_or_else(|| body.to_string())
}

// ─── Response types ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_embeds_token_under_api_base() {
        let timeout = Duration::from_secs(1);
        let n = TelegramNotifier::new("123:abc", "42", "http://localhost:9/", timeout).unwrap();
        assert_eq!(n.url, "http://localhost:9/bot123:abc/sendMessage");
        assert_eq!(n.chat_id(), "42");
    }

    #[test]
    fn debug_output_hides_token() {
        let timeout = Duration::from_secs(1);
        let n = TelegramNotifier::new("secret-token", "42", "http://localhost:9", timeout).unwrap();
        let shown = format!("{n:?}");
        assert!(!shown.contains("secret-token"), "token leaked: {shown}");
    }

    #[test]
    fn describe_prefers_api_description() {
        let body = r#"{"ok":false,"error_code":400,"description":"Bad Request: chat not found"}"#;
        assert_eq!(describe(body), "Bad Request: chat not found");
        assert_eq!(describe("<html>oops</html>"), "<html>oops</html>");
    }
}
