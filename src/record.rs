//! Inbound message model and the outbound wire record.
//!
//! `InboundMessage` is the per-request view of one decoded Telegram message;
//! `OutboundRecord` is the flat JSON mapping enqueued to the topic. The
//! record's serde field names are the persisted contract with downstream
//! subscribers - renaming any of them is a breaking change.

use chrono::{DateTime, Utc};
use chrono_tz::America::El_Salvador;
use serde::Serialize;
use teloxide::types::{Chat, Message};

/// One decoded inbound chat message. Constructed from the webhook payload,
/// read-only, discarded when the request completes.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    /// Telegram user id of the sender
    pub sender_id: u64,
    /// Sender's full display name
    pub sender_display_name: String,
    /// Raw message body
    pub text: String,
    /// Platform-assigned message id, unique per chat
    pub message_id: i32,
    /// Destination chat id
    pub chat_id: i64,
    /// Destination chat kind (private, group, supergroup, channel)
    pub chat_kind: &'static str,
    /// When the platform received the message, UTC
    pub received_at: DateTime<Utc>,
}

impl InboundMessage {
    /// Builds the inbound view from a decoded Telegram message.
    ///
    /// Returns `None` when the message carries no text or no sender, which
    /// means there is nothing to republish.
    pub fn from_message(msg: &Message) -> Option<Self> {
        let from = msg.from.as_ref()?;
        let text = msg.text()?;

        Some(Self {
            sender_id: from.id.0,
            sender_display_name: from.full_name(),
            text: text.to_owned(),
            message_id: msg.id.0,
            chat_id: msg.chat.id.0,
            chat_kind: chat_kind_label(&msg.chat),
            received_at: msg.date,
        })
    }
}

/// The unit enqueued to the topic. Field names are frozen; `timestamp` is
/// normalized to America/El_Salvador and rendered ISO-8601 regardless of the
/// offset the platform delivered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundRecord {
    pub user_id: u64,
    pub user_name: String,
    pub text: String,
    pub message_id: i32,
    pub chat_id: i64,
    pub chat_type: String,
    pub timestamp: String,
}

impl From<&InboundMessage> for OutboundRecord {
    fn from(inbound: &InboundMessage) -> Self {
        Self {
            user_id: inbound.sender_id,
            user_name: inbound.sender_display_name.clone(),
            text: inbound.text.clone(),
            message_id: inbound.message_id,
            chat_id: inbound.chat_id,
            chat_type: inbound.chat_kind.to_string(),
            timestamp: inbound
                .received_at
                .with_timezone(&El_Salvador)
                .to_rfc3339(),
        }
    }
}

fn chat_kind_label(chat: &Chat) -> &'static str {
    if chat.is_private() {
        "private"
    } else if chat.is_group() {
        "group"
    } else if chat.is_supergroup() {
        "supergroup"
    } else {
        "channel"
    }
}
