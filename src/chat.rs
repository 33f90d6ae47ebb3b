//! Chat platform client boundary.
//!
//! The rest of the crate talks to Telegram through [`ChatClient`] so the
//! handlers can be exercised without network access. [`TelegramChat`] is the
//! production implementation backed by teloxide.

use async_trait::async_trait;
use reqwest::ClientBuilder;
use teloxide::prelude::*;
use url::Url;

use crate::config;

/// Operations the receiver needs from the chat platform.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Sends a plain text message into a chat.
    async fn send_text(&self, chat_id: i64, text: &str) -> anyhow::Result<()>;

    /// Registers `url` as the platform's webhook target. Registering the
    /// same URL repeatedly is a no-op on the platform side.
    async fn register_webhook(&self, url: &Url) -> anyhow::Result<()>;
}

/// teloxide-backed chat client.
pub struct TelegramChat {
    bot: Bot,
}

impl TelegramChat {
    /// Creates a bot instance with a timeout-configured HTTP client
    ///
    /// # Returns
    /// * `Ok(TelegramChat)` - Successfully created client
    /// * `Err(anyhow::Error)` - Failed to build the underlying HTTP client
    pub fn new(token: &str) -> anyhow::Result<Self> {
        let client = ClientBuilder::new().timeout(config::network::timeout()).build()?;
        Ok(Self {
            bot: Bot::with_client(token, client),
        })
    }
}

#[async_trait]
impl ChatClient for TelegramChat {
    async fn send_text(&self, chat_id: i64, text: &str) -> anyhow::Result<()> {
        self.bot.send_message(ChatId(chat_id), text).await?;
        Ok(())
    }

    async fn register_webhook(&self, url: &Url) -> anyhow::Result<()> {
        self.bot.set_webhook(url.clone()).await?;
        Ok(())
    }
}
