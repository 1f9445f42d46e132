//! Credential acquisition for the unzipflow collaborators.
//!
//! A credential is acquired once per invocation and handed to every client
//! the run constructs. Clients ask it for a bearer token scoped to the
//! service they talk to.

mod credential;
mod error;

pub use credential::{
    AccessToken, DefaultCredential, EnvironmentCredential, SharedCredential, StaticCredential,
    TokenCredential, TokenFileCredential, DEFAULT_TOKEN_ENV,
};
pub use error::{IdentityError, Result};
