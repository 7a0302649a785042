//! Error types for the follow-up notifier.

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Mail error: {0}")]
    Mail(#[from] MailError),

    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Errors from the onboarding data store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Request to data API failed: {0}")]
    Request(String),

    #[error("Data API returned errors: {0}")]
    Api(String),

    #[error("Malformed response from data API: {0}")]
    MalformedResponse(String),

    #[error("Onboarding record not found: {id}")]
    NotFound { id: String },
}

/// Errors from the outbound mail transport.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Invalid address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Failed to build message: {0}")]
    Build(String),

    #[error("SMTP transport error: {0}")]
    Transport(String),
}

/// Errors from the notification driver itself.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("No debtor contact email on onboarding record {id}")]
    MissingContact { id: String },

    /// The email went out but the follow-up count could not be persisted.
    /// The record will be observed with a stale count on the next run.
    #[error("Email sent for {id} (follow-up {sent_count}) but count update failed: {source}")]
    CountUpdateFailed {
        id: String,
        sent_count: u32,
        source: StoreError,
    },

    #[error("Invalid invocation event: {0}")]
    InvalidEvent(String),
}

/// Result type alias for the notifier.
pub type Result<T> = std::result::Result<T, Error>;
