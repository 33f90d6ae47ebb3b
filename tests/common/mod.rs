//! Shared fixtures and mock collaborators for receiver tests.

#![allow(dead_code)] // Not every test binary uses every helper

use async_trait::async_trait;
use std::sync::Mutex;
use url::Url;

use caja_bot::chat::ChatClient;
use caja_bot::publish::{PublishError, RecordPublisher};
use caja_bot::record::OutboundRecord;

/// Chat client that records every call instead of talking to Telegram.
#[derive(Default)]
pub struct MockChat {
    /// (chat_id, text) for every send_text call
    pub sent: Mutex<Vec<(i64, String)>>,
    /// URL of every register_webhook call
    pub registered: Mutex<Vec<Url>>,
    /// When set, register_webhook fails with this message
    pub fail_registration: Option<String>,
}

#[async_trait]
impl ChatClient for MockChat {
    async fn send_text(&self, chat_id: i64, text: &str) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push((chat_id, text.to_string()));
        Ok(())
    }

    async fn register_webhook(&self, url: &Url) -> anyhow::Result<()> {
        if let Some(msg) = &self.fail_registration {
            return Err(anyhow::anyhow!("{}", msg));
        }
        self.registered.lock().unwrap().push(url.clone());
        Ok(())
    }
}

/// Publisher that records every record instead of talking to the broker.
#[derive(Default)]
pub struct MockPublisher {
    pub published: Mutex<Vec<OutboundRecord>>,
    /// When true, every publish fails as if the broker were unreachable
    pub fail: bool,
}

#[async_trait]
impl RecordPublisher for MockPublisher {
    async fn publish(&self, record: &OutboundRecord) -> Result<String, PublishError> {
        if self.fail {
            return Err(PublishError::Connect("broker unreachable".to_string()));
        }
        let mut published = self.published.lock().unwrap();
        published.push(record.clone());
        Ok(format!("broker-{}", published.len()))
    }
}

/// Raw Telegram update JSON carrying one private-chat text message from Ana.
pub fn text_update(text: &str) -> serde_json::Value {
    serde_json::json!({
        "update_id": 1,
        "message": {
            "message_id": 7,
            "date": 1704067200,
            "chat": {"id": 42, "type": "private", "first_name": "Ana"},
            "from": {"id": 99, "is_bot": false, "first_name": "Ana"},
            "text": text
        }
    })
}

/// Same as [`text_update`] but tagged as a command by the platform.
pub fn command_update(text: &str) -> serde_json::Value {
    let mut update = text_update(text);
    let len = text.split_whitespace().next().unwrap_or(text).len();
    update["message"]["entities"] =
        serde_json::json!([{"type": "bot_command", "offset": 0, "length": len}]);
    update
}
