use anyhow::Result;
use dotenvy::dotenv;
use std::sync::Arc;

use caja_bot::chat::TelegramChat;
use caja_bot::publish::PubSubPublisher;
use caja_bot::server::{self, AppState};
use caja_bot::{config, init_logger};

/// Main entry point for the webhook receiver
///
/// # Errors
/// Returns an error if initialization fails (logging, HTTP client, bind).
#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env if present, before any config is read
    let _ = dotenv();

    init_logger(&config::LOG_FILE_PATH)?;

    // Catch panics from request tasks so they get logged instead of
    // disappearing with the connection.
    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("Panic caught: {:?}", panic_info);
        if let Some(location) = panic_info.location() {
            log::error!(
                "Panic at {}:{}:{}",
                location.file(),
                location.line(),
                location.column()
            );
        }
    }));

    let chat = match config::TELEGRAM_TOKEN.as_deref() {
        Some(token) => Some(Arc::new(TelegramChat::new(token)?) as Arc<dyn caja_bot::ChatClient>),
        None => {
            log::error!(
                "TELEGRAM_TOKEN environment variable not set; all requests will be answered with a configuration error"
            );
            None
        }
    };

    let publisher = Arc::new(PubSubPublisher::new(
        config::GOOGLE_CLOUD_PROJECT.clone(),
        config::PUBSUB_TOPIC,
    ));

    server::serve(*config::PORT, AppState { chat, publisher }).await
}
