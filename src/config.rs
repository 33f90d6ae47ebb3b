use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

/// Configuration constants for the receiver

/// Telegram bot credential
/// Read from TELEGRAM_TOKEN environment variable
/// Absent or empty means every request is answered with a configuration error;
/// the server still starts so the host keeps getting well-formed responses.
pub static TELEGRAM_TOKEN: Lazy<Option<String>> =
    Lazy::new(|| env::var("TELEGRAM_TOKEN").ok().filter(|t| !t.is_empty()));

/// Google Cloud project that owns the publish topic
/// Read from GOOGLE_CLOUD_PROJECT environment variable
/// Defaults to a placeholder so local runs against an emulator work
pub static GOOGLE_CLOUD_PROJECT: Lazy<String> =
    Lazy::new(|| env::var("GOOGLE_CLOUD_PROJECT").unwrap_or_else(|_| "example-project".to_string()));

/// Pub/Sub topic the free-text records are published to.
/// Fixed by the contract with downstream subscribers, not configurable.
pub const PUBSUB_TOPIC: &str = "telegram-transactions";

/// Path suffix of the webhook receiver endpoint.
/// Combined with the observed request host when registering the webhook.
pub const RECEIVER_PATH: &str = "/bot_receiver";

/// Listen port for the HTTP server
/// Read from PORT environment variable (hosting runtime convention), default 8080
pub static PORT: Lazy<u16> = Lazy::new(|| {
    env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080)
});

/// Log file path
/// Read from LOG_FILE environment variable
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE").unwrap_or_else(|_| "caja-bot.log".to_string()));

/// Network configuration
pub mod network {
    use super::Duration;

    /// Request timeout for Telegram API calls (in seconds)
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;

    /// Request timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}
