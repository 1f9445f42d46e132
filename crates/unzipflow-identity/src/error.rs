use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("environment variable '{name}' is not set")]
    MissingVariable { name: String },

    #[error("failed to read token file '{path}': {source}")]
    TokenFile { path: PathBuf, source: io::Error },

    #[error("credential source '{source_name}' returned an empty token")]
    EmptyToken { source_name: String },

    #[error("no credential available ({})", .attempts.join("; "))]
    Unavailable { attempts: Vec<String> },
}

pub type Result<T> = std::result::Result<T, IdentityError>;
