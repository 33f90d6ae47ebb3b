//! Webhook registration lifecycle.
//!
//! On every GET the receiver re-registers its own externally reachable URL
//! with the platform. Safe to repeat: registering the same URL twice is a
//! no-op on the platform side.

use url::Url;

use crate::chat::ChatClient;
use crate::config;
use crate::errors::{AppError, AppResult};

/// Externally reachable receiver URL for the observed request host.
///
/// An empty host would otherwise reparse the fixed path as the host
/// (`https:///bot_receiver` becomes `https://bot_receiver/`), so it is
/// rejected up front.
pub fn receiver_url(host: &str) -> Result<Url, url::ParseError> {
    if host.trim().is_empty() {
        return Err(url::ParseError::EmptyHost);
    }
    Url::parse(&format!("https://{}{}", host, config::RECEIVER_PATH))
}

/// Registers the receiver URL computed from `host` with the platform.
///
/// # Returns
/// * `Ok(())` - Webhook registered (or already registered)
/// * `Err(AppError::Registration)` - Invalid host or the platform rejected the call
pub async fn ensure_webhook(chat: &dyn ChatClient, host: &str) -> AppResult<()> {
    let url = receiver_url(host).map_err(|e| {
        AppError::Registration(anyhow::anyhow!("invalid webhook url for host {}: {}", host, e))
    })?;

    log::info!("Setting webhook to: {}", url);
    chat.register_webhook(&url)
        .await
        .map_err(AppError::Registration)?;
    log::info!("Webhook set successfully");

    Ok(())
}
