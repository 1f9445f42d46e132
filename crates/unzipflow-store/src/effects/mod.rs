//! I/O against object stores.

mod fetcher;
mod memory;
#[cfg(feature = "reqwest")]
mod rest;
mod store;

pub use fetcher::ArchiveFetcher;
pub use memory::{MemoryObjectStore, MemoryStorage, StoreCall};
#[cfg(feature = "reqwest")]
pub use rest::{BlobRestConnector, DEFAULT_API_VERSION, STORAGE_SCOPE};
pub use store::{ObjectStore, StoreConnector};
