use thiserror::Error;

/// Centralized error types for the receiver
///
/// Every failure that can cross a component boundary is converted to this
/// enum. Uses `thiserror` for automatic conversion and display formatting.
/// Publish failures have their own type ([`crate::publish::PublishError`])
/// because the dispatcher acts on them locally instead of propagating.
#[derive(Error, Debug)]
pub enum AppError {
    /// Required credential is missing; nothing else is attempted
    #[error("Configuration error")]
    Config,

    /// Inbound payload did not decode into a Telegram update.
    /// Treated as a benign no-op by the entry point, never a caller error.
    #[error("invalid update payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// Webhook registration with the platform failed
    #[error("{0}")]
    Registration(anyhow::Error),

    /// Anything else that escaped a handler; caught at the entry point boundary
    #[error("{0}")]
    Unhandled(#[from] anyhow::Error),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;
