use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{IdentityError, Result};

/// Environment variable consulted by [`DefaultCredential`] when none is configured.
pub const DEFAULT_TOKEN_ENV: &str = "UNZIPFLOW_ACCESS_TOKEN";

/// A bearer token. The secret never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    secret: Arc<str>,
}

impl AccessToken {
    pub fn new(secret: impl Into<Arc<str>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Value for an `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.secret)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Source of bearer tokens for a given service scope.
#[async_trait]
pub trait TokenCredential: Send + Sync {
    /// Short name used in diagnostics.
    fn name(&self) -> &str;

    async fn get_token(&self, scope: &str) -> Result<AccessToken>;
}

pub type SharedCredential = Arc<dyn TokenCredential>;

/// Always hands out the same token, whatever the scope.
#[derive(Clone, Debug)]
pub struct StaticCredential {
    token: AccessToken,
}

impl StaticCredential {
    pub fn new(secret: impl Into<Arc<str>>) -> Self {
        Self {
            token: AccessToken::new(secret),
        }
    }
}

#[async_trait]
impl TokenCredential for StaticCredential {
    fn name(&self) -> &str {
        "static"
    }

    async fn get_token(&self, _scope: &str) -> Result<AccessToken> {
        Ok(self.token.clone())
    }
}

/// Reads the token from an environment variable at request time.
#[derive(Clone, Debug)]
pub struct EnvironmentCredential {
    variable: String,
}

impl EnvironmentCredential {
    pub fn new(variable: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
        }
    }
}

#[async_trait]
impl TokenCredential for EnvironmentCredential {
    fn name(&self) -> &str {
        &self.variable
    }

    async fn get_token(&self, _scope: &str) -> Result<AccessToken> {
        let secret = std::env::var(&self.variable).map_err(|_| IdentityError::MissingVariable {
            name: self.variable.clone(),
        })?;
        non_empty(self.name(), secret.trim())
    }
}

/// Reads the token from a file, as mounted by most secret stores.
#[derive(Clone, Debug)]
pub struct TokenFileCredential {
    path: PathBuf,
    label: String,
}

impl TokenFileCredential {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let label = path.display().to_string();
        Self { path, label }
    }

    /// Resolve the file path from `<variable>_FILE`, if set.
    pub fn from_env(variable: &str) -> Option<Self> {
        std::env::var_os(format!("{variable}_FILE")).map(Self::new)
    }
}

#[async_trait]
impl TokenCredential for TokenFileCredential {
    fn name(&self) -> &str {
        &self.label
    }

    async fn get_token(&self, _scope: &str) -> Result<AccessToken> {
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| IdentityError::TokenFile {
                path: self.path.clone(),
                source,
            })?;
        non_empty(self.name(), contents.trim())
    }
}

fn non_empty(source_name: &str, secret: &str) -> Result<AccessToken> {
    if secret.is_empty() {
        return Err(IdentityError::EmptyToken {
            source_name: source_name.to_string(),
        });
    }
    Ok(AccessToken::new(secret))
}

/// Tries each configured source in order and returns the first token found.
pub struct DefaultCredential {
    sources: Vec<SharedCredential>,
}

impl DefaultCredential {
    /// The standard chain: `<variable>` then the file named by `<variable>_FILE`.
    pub fn acquire(variable: &str) -> SharedCredential {
        let mut sources: Vec<SharedCredential> = vec![Arc::new(EnvironmentCredential::new(variable))];
        if let Some(file) = TokenFileCredential::from_env(variable) {
            sources.push(Arc::new(file));
        }
        Arc::new(Self { sources })
    }

    pub fn with_sources(sources: Vec<SharedCredential>) -> Self {
        Self { sources }
    }
}

#[async_trait]
impl TokenCredential for DefaultCredential {
    fn name(&self) -> &str {
        "default"
    }

    async fn get_token(&self, scope: &str) -> Result<AccessToken> {
        let mut attempts = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            match source.get_token(scope).await {
                Ok(token) => {
                    debug!(source = source.name(), scope, "acquired access token");
                    return Ok(token);
                }
                Err(e) => attempts.push(e.to_string()),
            }
        }
        Err(IdentityError::Unavailable { attempts })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn static_credential_ignores_scope() {
        let credential = StaticCredential::new("abc");
        let token = credential.get_token("https://storage/.default").await.unwrap();
        assert_eq!(token.secret(), "abc");
        assert_eq!(token.bearer(), "Bearer abc");
    }

    #[test]
    fn debug_output_hides_secret() {
        let token = AccessToken::new("super-secret");
        let printed = format!("{token:?}");
        assert!(!printed.contains("super-secret"));
    }

    #[tokio::test]
    async fn missing_variable_is_reported_by_name() {
        let credential = EnvironmentCredential::new("UNZIPFLOW_TEST_SURELY_UNSET_TOKEN");
        let err = credential.get_token("scope").await.unwrap_err();
        assert!(err.to_string().contains("UNZIPFLOW_TEST_SURELY_UNSET_TOKEN"));
    }

    #[tokio::test]
    async fn token_file_is_trimmed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "  token-from-file  ").unwrap();
        let credential = TokenFileCredential::new(file.path());
        let token = credential.get_token("scope").await.unwrap();
        assert_eq!(token.secret(), "token-from-file");
    }

    #[tokio::test]
    async fn empty_token_file_is_rejected() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let credential = TokenFileCredential::new(file.path());
        let err = credential.get_token("scope").await.unwrap_err();
        assert!(matches!(err, IdentityError::EmptyToken { .. }));
    }

    #[tokio::test]
    async fn chain_falls_through_to_next_source() {
        let chain = DefaultCredential::with_sources(vec![
            Arc::new(EnvironmentCredential::new("UNZIPFLOW_TEST_ALSO_UNSET_TOKEN")),
            Arc::new(StaticCredential::new("fallback")),
        ]);
        let token = chain.get_token("scope").await.unwrap();
        assert_eq!(token.secret(), "fallback");
    }

    #[tokio::test]
    async fn exhausted_chain_lists_every_attempt() {
        let chain = DefaultCredential::with_sources(vec![
            Arc::new(EnvironmentCredential::new("UNZIPFLOW_TEST_UNSET_A")),
            Arc::new(EnvironmentCredential::new("UNZIPFLOW_TEST_UNSET_B")),
        ]);
        let err = chain.get_token("scope").await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("UNZIPFLOW_TEST_UNSET_A"));
        assert!(message.contains("UNZIPFLOW_TEST_UNSET_B"));
    }
}
