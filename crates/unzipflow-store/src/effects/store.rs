use std::sync::Arc;

use async_trait::async_trait;
use unzipflow_identity::SharedCredential;

use crate::body::{ByteStream, ObjectBody};
use crate::error::Result;

/// Client for one object-store service, addressed by container and object name.
///
/// # Implementations
///
/// - [`MemoryObjectStore`](crate::MemoryObjectStore): in-process, for tests and embedding
/// - the REST client behind [`BlobRestConnector`](crate::BlobRestConnector)
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn container_exists(&self, container: &str) -> Result<bool>;

    async fn object_exists(&self, container: &str, name: &str) -> Result<bool>;

    /// Open the object's content as a stream of chunks.
    async fn download(&self, container: &str, name: &str) -> Result<ByteStream>;

    /// Write `body` to `container/name` and return the number of bytes stored.
    ///
    /// With `overwrite` unset an existing object is an error.
    async fn upload(
        &self,
        container: &str,
        name: &str,
        body: ObjectBody,
        overwrite: bool,
    ) -> Result<u64>;
}

/// Resolves a service URL into a client authenticated with `credential`.
pub trait StoreConnector: Send + Sync {
    fn connect(&self, service_url: &str, credential: &SharedCredential)
    -> Result<Arc<dyn ObjectStore>>;
}
