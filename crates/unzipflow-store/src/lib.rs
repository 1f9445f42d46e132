//! Object-store access for the unzip pipeline.
//!
//! # Architecture
//!
//! - [`ObjectStore`] - container/object existence, streamed download and upload
//! - [`StoreConnector`] - resolves a service URL into an [`ObjectStore`]
//! - [`ArchiveFetcher`] - validates a source location and buffers it in memory
//! - [`MemoryStorage`] - in-process backend that records every call
//! - [`BlobRestConnector`] - blob REST protocol over `reqwest`

mod body;
mod effects;
mod error;

pub use body::{ByteStream, BoxStream, ObjectBody, DEFAULT_CHUNK_SIZE};
pub use effects::{
    ArchiveFetcher, MemoryObjectStore, MemoryStorage, ObjectStore, StoreCall, StoreConnector,
};
#[cfg(feature = "reqwest")]
pub use effects::{BlobRestConnector, DEFAULT_API_VERSION, STORAGE_SCOPE};
pub use error::{Result, StoreError};
