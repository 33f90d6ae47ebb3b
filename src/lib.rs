//! caja-bot - Telegram webhook receiver for a small-shop transactions bot
//!
//! Accepts Telegram webhook calls over HTTP, answers commands synchronously,
//! and republishes free-text messages onto a Google Cloud Pub/Sub topic for
//! downstream processing.
//!
//! # Module Structure
//!
//! - `config`: Environment configuration and constants
//! - `errors`: Centralized error types
//! - `record`: Inbound message model and the outbound wire record
//! - `publish`: Pub/Sub publisher and completion modes
//! - `chat`: Chat platform client boundary
//! - `dispatch`: Update classification and handlers
//! - `webhook`: Webhook registration lifecycle
//! - `server`: HTTP entry point

pub mod chat;
pub mod config;
pub mod dispatch;
pub mod errors;
pub mod logging;
pub mod publish;
pub mod record;
pub mod server;
pub mod webhook;

// Re-export commonly used types for convenience
pub use chat::{ChatClient, TelegramChat};
pub use dispatch::dispatch;
pub use errors::{AppError, AppResult};
pub use logging::init_logger;
pub use publish::{PubSubPublisher, PublishError, RecordPublisher};
pub use record::{InboundMessage, OutboundRecord};
pub use server::{AppState, router, serve};
