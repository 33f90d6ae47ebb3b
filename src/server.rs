//! HTTP entry point.
//!
//! One method-routed endpoint: GET (re-)registers the webhook, anything else
//! is processed as an inbound update. Every failure inside is mapped to a
//! response here; the handler never lets an error escape to the host.

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, header};
use axum::routing::any;
use std::net::SocketAddr;
use std::sync::Arc;
use teloxide::types::Update;
use tokio::net::TcpListener;

use crate::chat::ChatClient;
use crate::config;
use crate::dispatch::dispatch;
use crate::errors::{AppError, AppResult};
use crate::publish::RecordPublisher;
use crate::webhook::ensure_webhook;

/// Shared state for the receiver.
///
/// `chat` is `None` when TELEGRAM_TOKEN is not configured; the server still
/// answers every request, with a configuration error, instead of refusing to
/// start. The publisher handle is the only resource shared across requests.
#[derive(Clone)]
pub struct AppState {
    pub chat: Option<Arc<dyn ChatClient>>,
    pub publisher: Arc<dyn RecordPublisher>,
}

/// Builds the receiver router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(config::RECEIVER_PATH, any(receiver))
        .with_state(state)
}

/// Start the receiver server.
pub async fn serve(port: u16, state: AppState) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = router(state);

    log::info!("Starting receiver on http://{}", addr);
    log::info!("  GET  {}  - register webhook", config::RECEIVER_PATH);
    log::info!("  POST {}  - process one update", config::RECEIVER_PATH);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Single entry point; guarantees a response for every request.
async fn receiver(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, String) {
    log::info!("Received {} request", method);

    let Some(chat) = state.chat.as_deref() else {
        log::error!("TELEGRAM_TOKEN environment variable not set");
        return (StatusCode::INTERNAL_SERVER_ERROR, AppError::Config.to_string());
    };

    if method == Method::GET {
        return register(chat, &headers).await;
    }

    // Any non-GET verb carries an update.
    process_update(chat, state.publisher.as_ref(), &body).await
}

async fn register(chat: &dyn ChatClient, headers: &HeaderMap) -> (StatusCode, String) {
    let host = match headers.get(header::HOST).map(|h| h.to_str()) {
        Some(Ok(host)) => host,
        _ => {
            log::error!("GET request without a usable Host header");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Webhook error: missing host header".to_string(),
            );
        }
    };

    match ensure_webhook(chat, host).await {
        Ok(()) => (StatusCode::OK, "webhook set".to_string()),
        Err(e) => {
            log::error!("Failed to set webhook: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Webhook error: {}", e),
            )
        }
    }
}

async fn process_update(
    chat: &dyn ChatClient,
    publisher: &dyn RecordPublisher,
    body: &[u8],
) -> (StatusCode, String) {
    let update = match decode_update(body) {
        Ok(update) => update,
        Err(e) => {
            // Malformed payloads are answered with success so the platform
            // does not redeliver them forever.
            log::warn!("Received undecodable update: {}", e);
            return (StatusCode::OK, "ok".to_string());
        }
    };

    log::info!("Processing update {}", update.id.0);
    match dispatch(chat, publisher, &update).await {
        Ok(()) => {
            log::info!("Update {} processed successfully", update.id.0);
            (StatusCode::OK, "ok".to_string())
        }
        Err(e) => {
            log::error!("Error processing update {}: {}", update.id.0, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Processing error: {}", e),
            )
        }
    }
}

fn decode_update(body: &[u8]) -> AppResult<Update> {
    Ok(serde_json::from_slice(body)?)
}
