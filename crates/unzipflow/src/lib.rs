//! Extract an archive held in an object store, upload each file to a
//! destination container and announce every uploaded file on a topic.
//!
//! # Architecture
//!
//! - [`request`] - the parameters of one invocation
//! - [`pipeline`] - fetch, extract, upload-then-notify, in strict sequence
//! - [`status`] - folds the outcome into the status record the host receives
//! - [`config`] - settings file for the command-line host

pub mod config;
pub mod pipeline;
pub mod request;
pub mod status;
mod error;
mod report;

pub use config::Settings;
pub use error::{ConfigError, ErrorKind, RunError};
pub use pipeline::{Pipeline, PipelineOptions};
pub use report::{PublishedFile, RunReport};
pub use request::InvocationRequest;
pub use status::{TaskStatus, invoke};
