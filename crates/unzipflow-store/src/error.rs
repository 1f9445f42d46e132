//! Error types for unzipflow-store.

use thiserror::Error;
use unzipflow_identity::IdentityError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid service URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("no storage account registered for '{0}'")]
    UnknownAccount(String),

    #[error("container '{0}' not found")]
    ContainerNotFound(String),

    #[error("object '{name}' not found in container '{container}'")]
    ObjectNotFound { container: String, name: String },

    #[error("object '{name}' already exists in container '{container}'")]
    AlreadyExists { container: String, name: String },

    #[error("body length mismatch: declared {declared} bytes, streamed {streamed}")]
    LengthMismatch { declared: u64, streamed: u64 },

    #[error("upload body failed: {0}")]
    Body(String),

    #[error("storage request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("failed to acquire storage credential: {0}")]
    Credential(#[from] IdentityError),

    #[error("{0}")]
    Injected(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
