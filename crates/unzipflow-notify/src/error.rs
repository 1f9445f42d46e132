//! Error types for unzipflow-notify.

use thiserror::Error;
use unzipflow_identity::IdentityError;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("invalid messaging endpoint '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("sender for topic '{0}' is closed")]
    SenderClosed(String),

    #[error("messaging connection is disposed")]
    Disposed,

    #[error("attribute '{name}' cannot be sent as a header")]
    InvalidAttribute { name: String },

    #[error("message '{message_id}' rejected with status {status}: {body}")]
    Rejected {
        message_id: String,
        status: u16,
        body: String,
    },

    #[error("network error: {0}")]
    Network(String),

    #[error("failed to serialize message body: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to acquire messaging credential: {0}")]
    Credential(#[from] IdentityError),

    #[error("{0}")]
    Injected(String),
}

pub type Result<T> = std::result::Result<T, NotifyError>;
