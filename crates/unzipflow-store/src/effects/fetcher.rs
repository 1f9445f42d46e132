use bytes::{Bytes, BytesMut};
use futures_util::TryStreamExt;
use tracing::{debug, info};

use crate::effects::store::ObjectStore;
use crate::error::{Result, StoreError};

/// Validates a source location and buffers the whole object in memory.
///
/// The archive reader needs random access, so nothing is handed on until
/// the final chunk has arrived.
pub struct ArchiveFetcher<'a> {
    store: &'a dyn ObjectStore,
}

impl<'a> ArchiveFetcher<'a> {
    pub fn new(store: &'a dyn ObjectStore) -> Self {
        Self { store }
    }

    /// Fails with [`StoreError::ContainerNotFound`] or
    /// [`StoreError::ObjectNotFound`] before any content is read.
    pub async fn fetch(&self, container: &str, name: &str) -> Result<Bytes> {
        if !self.store.container_exists(container).await? {
            return Err(StoreError::ContainerNotFound(container.to_string()));
        }
        if !self.store.object_exists(container, name).await? {
            return Err(StoreError::ObjectNotFound {
                container: container.to_string(),
                name: name.to_string(),
            });
        }

        let mut stream = self.store.download(container, name).await?;
        let mut buffer = BytesMut::new();
        let mut chunks = 0usize;

        while let Some(chunk) = stream.try_next().await? {
            buffer.extend_from_slice(&chunk);
            chunks += 1;
            debug!(container, object = name, bytes = buffer.len(), "received chunk");
        }

        info!(
            container,
            object = name,
            bytes = buffer.len(),
            chunks,
            "downloaded source archive"
        );
        Ok(buffer.freeze())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryObjectStore, StoreCall};

    #[tokio::test]
    async fn missing_container_stops_before_object_check() {
        let store = MemoryObjectStore::new();
        let err = ArchiveFetcher::new(&store)
            .fetch("incoming", "batch.zip")
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::ContainerNotFound(ref c) if c == "incoming"));
        assert_eq!(
            store.calls(),
            [StoreCall::ContainerExists {
                container: "incoming".into()
            }]
        );
    }

    #[tokio::test]
    async fn missing_object_stops_before_download() {
        let store = MemoryObjectStore::new();
        store.create_container("incoming");
        let err = ArchiveFetcher::new(&store)
            .fetch("incoming", "batch.zip")
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::ObjectNotFound { ref name, .. } if name == "batch.zip"));
        assert!(
            !store
                .calls()
                .iter()
                .any(|c| matches!(c, StoreCall::Download { .. }))
        );
    }

    #[tokio::test]
    async fn buffers_every_chunk() {
        let store = MemoryObjectStore::with_download_chunk_size(3);
        store.put("incoming", "batch.zip", Bytes::from_static(b"0123456789"));

        let bytes = ArchiveFetcher::new(&store)
            .fetch("incoming", "batch.zip")
            .await
            .unwrap();
        assert_eq!(bytes.as_ref(), b"0123456789");
    }
}
