//! Settings for the command-line host.
//!
//! Every key has a default, so a missing or empty file is valid.
//!
//! ```toml
//! [messaging]
//! namespace = "https://logistics.servicebus.windows.net"
//!
//! [upload]
//! chunk_size = 1048576
//!
//! [log]
//! filter = "unzipflow=debug,info"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use unzipflow_identity::DEFAULT_TOKEN_ENV;
use unzipflow_store::{DEFAULT_API_VERSION, DEFAULT_CHUNK_SIZE};

use crate::error::ConfigError;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub messaging: MessagingSettings,
    pub storage: StorageSettings,
    pub upload: UploadSettings,
    pub credential: CredentialSettings,
    pub log: LogSettings,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MessagingSettings {
    /// Namespace endpoint the topic lives under.
    pub namespace: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageSettings {
    pub api_version: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadSettings {
    pub chunk_size: usize,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CredentialSettings {
    /// Variable holding the bearer token; `<token_env>_FILE` may name a file instead.
    pub token_env: String,
}

impl Default for CredentialSettings {
    fn default() -> Self {
        Self {
            token_env: DEFAULT_TOKEN_ENV.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogSettings {
    /// `EnvFilter` directives, used when `RUST_LOG` is unset.
    pub filter: String,
    pub json: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

impl Settings {
    /// Load from `path`, or the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let settings: Self = toml::from_str(contents)?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.upload.chunk_size == 0 {
            return Err(ConfigError::Invalid("upload.chunk_size must be positive".into()));
        }
        if self.credential.token_env.trim().is_empty() {
            return Err(ConfigError::Invalid("credential.token_env must not be empty".into()));
        }
        Ok(())
    }
}
