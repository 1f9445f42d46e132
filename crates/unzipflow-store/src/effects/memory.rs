//! In-process object store.
//!
//! Records every call in order and can be told to fail the n-th upload,
//! which is how pipeline tests observe partial-failure behavior.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use bytes::Bytes;
use unzipflow_identity::SharedCredential;

use crate::body::{ByteStream, ObjectBody};
use crate::effects::store::{ObjectStore, StoreConnector};
use crate::error::{Result, StoreError};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreCall {
    ContainerExists { container: String },
    ObjectExists { container: String, name: String },
    Download { container: String, name: String },
    Upload {
        container: String,
        name: String,
        bytes: u64,
        chunks: usize,
    },
}

#[derive(Default)]
struct State {
    containers: BTreeMap<String, BTreeMap<String, Bytes>>,
    calls: Vec<StoreCall>,
    upload_attempts: usize,
    fail_upload_at: Option<usize>,
}

/// One storage account. Clones share state.
#[derive(Clone)]
pub struct MemoryObjectStore {
    state: Arc<Mutex<State>>,
    download_chunk_size: usize,
}

impl Default for MemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::with_download_chunk_size(64 * 1024)
    }

    pub fn with_download_chunk_size(download_chunk_size: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
            download_chunk_size,
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // a panic while holding the lock leaves plain data behind
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn create_container(&self, container: &str) {
        self.lock()
            .containers
            .entry(container.to_string())
            .or_default();
    }

    /// Store an object, creating its container if needed.
    pub fn put(&self, container: &str, name: &str, data: Bytes) {
        self.lock()
            .containers
            .entry(container.to_string())
            .or_default()
            .insert(name.to_string(), data);
    }

    pub fn get(&self, container: &str, name: &str) -> Option<Bytes> {
        self.lock()
            .containers
            .get(container)
            .and_then(|objects| objects.get(name))
            .cloned()
    }

    /// Object names in `container`, sorted.
    pub fn list(&self, container: &str) -> Vec<String> {
        self.lock()
            .containers
            .get(container)
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    /// Names of completed uploads, in completion order.
    pub fn uploads(&self) -> Vec<String> {
        self.lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                StoreCall::Upload { name, .. } => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    /// Make the `attempt`-th upload (1-based) fail without storing anything.
    pub fn fail_upload_at(&self, attempt: usize) {
        self.lock().fail_upload_at = Some(attempt);
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn container_exists(&self, container: &str) -> Result<bool> {
        let mut state = self.lock();
        state.calls.push(StoreCall::ContainerExists {
            container: container.to_string(),
        });
        Ok(state.containers.contains_key(container))
    }

    async fn object_exists(&self, container: &str, name: &str) -> Result<bool> {
        let mut state = self.lock();
        state.calls.push(StoreCall::ObjectExists {
            container: container.to_string(),
            name: name.to_string(),
        });
        Ok(state
            .containers
            .get(container)
            .is_some_and(|objects| objects.contains_key(name)))
    }

    async fn download(&self, container: &str, name: &str) -> Result<ByteStream> {
        let data = {
            let mut state = self.lock();
            state.calls.push(StoreCall::Download {
                container: container.to_string(),
                name: name.to_string(),
            });
            state
                .containers
                .get(container)
                .and_then(|objects| objects.get(name))
                .cloned()
                .ok_or_else(|| StoreError::ObjectNotFound {
                    container: container.to_string(),
                    name: name.to_string(),
                })?
        };
        Ok(ObjectBody::chunked(data, self.download_chunk_size).into_stream())
    }

    async fn upload(
        &self,
        container: &str,
        name: &str,
        body: ObjectBody,
        overwrite: bool,
    ) -> Result<u64> {
        {
            let mut state = self.lock();
            state.upload_attempts += 1;
            if state.fail_upload_at == Some(state.upload_attempts) {
                return Err(StoreError::Injected(format!(
                    "upload of '{name}' rejected by test store"
                )));
            }
            if !state.containers.contains_key(container) {
                return Err(StoreError::ContainerNotFound(container.to_string()));
            }
        }

        let chunks = body.collect_chunks().await?;
        let chunk_count = chunks.len();
        let data = Bytes::from(chunks.concat());
        let bytes = data.len() as u64;

        let mut state = self.lock();
        let objects = state
            .containers
            .get_mut(container)
            .ok_or_else(|| StoreError::ContainerNotFound(container.to_string()))?;
        if !overwrite && objects.contains_key(name) {
            return Err(StoreError::AlreadyExists {
                container: container.to_string(),
                name: name.to_string(),
            });
        }
        objects.insert(name.to_string(), data);
        state.calls.push(StoreCall::Upload {
            container: container.to_string(),
            name: name.to_string(),
            bytes,
            chunks: chunk_count,
        });
        Ok(bytes)
    }
}

/// Storage accounts keyed by service URL.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    accounts: Arc<Mutex<HashMap<String, MemoryObjectStore>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// The account behind `service_url`, created on first use.
    pub fn account(&self, service_url: &str) -> MemoryObjectStore {
        self.accounts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .entry(service_url.to_string())
            .or_default()
            .clone()
    }
}

impl StoreConnector for MemoryStorage {
    fn connect(
        &self,
        service_url: &str,
        _credential: &SharedCredential,
    ) -> Result<Arc<dyn ObjectStore>> {
        let accounts = self
            .accounts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let account = accounts
            .get(service_url)
            .cloned()
            .ok_or_else(|| StoreError::UnknownAccount(service_url.to_string()))?;
        Ok(Arc::new(account))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unzipflow_identity::StaticCredential;

    #[tokio::test]
    async fn upload_overwrites_by_default() {
        let store = MemoryObjectStore::new();
        store.put("out", "drop/a.txt", Bytes::from_static(b"old"));

        let body = ObjectBody::chunked(Bytes::from_static(b"new"), 2);
        let written = store.upload("out", "drop/a.txt", body, true).await.unwrap();

        assert_eq!(written, 3);
        assert_eq!(store.get("out", "drop/a.txt").unwrap().as_ref(), b"new");
        assert_eq!(store.list("out"), ["drop/a.txt"]);
        assert!(store.calls().contains(&StoreCall::Upload {
            container: "out".into(),
            name: "drop/a.txt".into(),
            bytes: 3,
            chunks: 2,
        }));
    }

    #[tokio::test]
    async fn upload_without_overwrite_refuses_existing() {
        let store = MemoryObjectStore::new();
        store.put("out", "a.txt", Bytes::from_static(b"old"));

        let body = ObjectBody::chunked(Bytes::from_static(b"new"), 2);
        let err = store.upload("out", "a.txt", body, false).await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn injected_failure_hits_only_that_attempt() {
        let store = MemoryObjectStore::new();
        store.create_container("out");
        store.fail_upload_at(2);

        let upload = |name: &'static str| {
            let store = store.clone();
            async move {
                let body = ObjectBody::chunked(Bytes::from_static(b"x"), 1);
                store.upload("out", name, body, true).await
            }
        };

        assert!(upload("1").await.is_ok());
        assert!(upload("2").await.is_err());
        assert!(upload("3").await.is_ok());
        assert_eq!(store.uploads(), ["1", "3"]);
    }

    #[test]
    fn connector_resolves_registered_accounts_only() {
        let storage = MemoryStorage::new();
        storage.account("https://src.example");
        let credential: SharedCredential = Arc::new(StaticCredential::new("t"));

        assert!(storage.connect("https://src.example", &credential).is_ok());
        assert!(matches!(
            storage.connect("https://other.example", &credential),
            Err(StoreError::UnknownAccount(_))
        ));
    }
}
