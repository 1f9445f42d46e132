use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;
use unzipflow_notify::NotifyError;
use unzipflow_store::StoreError;

/// Why a run stopped.
///
/// The display text is what ends up in the status record.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Source blob container '{container}' not found.")]
    SourceContainerNotFound { container: String },

    #[error("Source blob '{object}' not found.")]
    SourceObjectNotFound { object: String },

    #[error("failed to read archive: {0}")]
    Extraction(#[from] unzipflow_archive::Error),

    #[error("failed to upload '{object}': {source}")]
    Upload {
        object: String,
        #[source]
        source: StoreError,
    },

    #[error("failed to publish notification for '{object}': {source}")]
    Publish {
        object: String,
        #[source]
        source: NotifyError,
    },

    #[error("messaging session failed: {0}")]
    Messaging(#[source] NotifyError),

    #[error(transparent)]
    Unknown(Box<dyn std::error::Error + Send + Sync>),
}

/// Machine-readable classification of a [`RunError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    SourceContainerNotFound,
    SourceObjectNotFound,
    ExtractionFailure,
    UploadFailure,
    PublishFailure,
    UnknownFailure,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::SourceContainerNotFound => "SourceContainerNotFound",
            ErrorKind::SourceObjectNotFound => "SourceObjectNotFound",
            ErrorKind::ExtractionFailure => "ExtractionFailure",
            ErrorKind::UploadFailure => "UploadFailure",
            ErrorKind::PublishFailure => "PublishFailure",
            ErrorKind::UnknownFailure => "UnknownFailure",
        };
        f.write_str(name)
    }
}

impl RunError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RunError::SourceContainerNotFound { .. } => ErrorKind::SourceContainerNotFound,
            RunError::SourceObjectNotFound { .. } => ErrorKind::SourceObjectNotFound,
            RunError::Extraction(_) => ErrorKind::ExtractionFailure,
            RunError::Upload { .. } => ErrorKind::UploadFailure,
            RunError::Publish { .. } | RunError::Messaging(_) => ErrorKind::PublishFailure,
            RunError::Unknown(_) => ErrorKind::UnknownFailure,
        }
    }

    pub(crate) fn unknown(e: impl std::error::Error + Send + Sync + 'static) -> Self {
        RunError::Unknown(Box::new(e))
    }

    /// Map a source fetch failure, keeping the two not-found cases distinct.
    pub(crate) fn from_fetch(e: StoreError) -> Self {
        match e {
            StoreError::ContainerNotFound(container) => {
                RunError::SourceContainerNotFound { container }
            }
            StoreError::ObjectNotFound { name, .. } => RunError::SourceObjectNotFound { object: name },
            other => RunError::unknown(other),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file '{path}': {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("invalid settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid settings: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_messages_name_the_location() {
        let err = RunError::from_fetch(StoreError::ContainerNotFound("incoming".into()));
        assert_eq!(err.kind(), ErrorKind::SourceContainerNotFound);
        assert_eq!(err.to_string(), "Source blob container 'incoming' not found.");

        let err = RunError::from_fetch(StoreError::ObjectNotFound {
            container: "incoming".into(),
            name: "batch.zip".into(),
        });
        assert_eq!(err.kind(), ErrorKind::SourceObjectNotFound);
        assert_eq!(err.to_string(), "Source blob 'batch.zip' not found.");
    }

    #[test]
    fn other_fetch_failures_are_unknown() {
        let err = RunError::from_fetch(StoreError::Network("connection reset".into()));
        assert_eq!(err.kind(), ErrorKind::UnknownFailure);
        assert_eq!(err.to_string(), "network error: connection reset");
    }

    #[test]
    fn session_failures_classify_as_publish() {
        let err = RunError::Messaging(NotifyError::Disposed);
        assert_eq!(err.kind(), ErrorKind::PublishFailure);
    }
}
