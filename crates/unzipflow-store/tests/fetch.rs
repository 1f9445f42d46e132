//! Archive fetching through a connector-resolved store.

use std::sync::Arc;

use bytes::Bytes;
use unzipflow_identity::{SharedCredential, StaticCredential};
use unzipflow_store::{ArchiveFetcher, MemoryStorage, StoreCall, StoreConnector, StoreError};

const SOURCE_URL: &str = "https://source.blob.example";

fn credential() -> SharedCredential {
    Arc::new(StaticCredential::new("test-token"))
}

#[tokio::test]
async fn fetch_through_connector() {
    let storage = MemoryStorage::new();
    let account = storage.account(SOURCE_URL);
    account.put("incoming", "2024/batch.zip", Bytes::from(vec![7u8; 200_000]));

    let store = storage.connect(SOURCE_URL, &credential()).unwrap();
    let buffer = ArchiveFetcher::new(store.as_ref())
        .fetch("incoming", "2024/batch.zip")
        .await
        .unwrap();

    assert_eq!(buffer.len(), 200_000);
    assert_eq!(
        account.calls(),
        [
            StoreCall::ContainerExists {
                container: "incoming".into()
            },
            StoreCall::ObjectExists {
                container: "incoming".into(),
                name: "2024/batch.zip".into()
            },
            StoreCall::Download {
                container: "incoming".into(),
                name: "2024/batch.zip".into()
            },
        ]
    );
}

#[tokio::test]
async fn not_found_errors_name_the_location() {
    let storage = MemoryStorage::new();
    storage.account(SOURCE_URL).create_container("incoming");
    let store = storage.connect(SOURCE_URL, &credential()).unwrap();

    let err = ArchiveFetcher::new(store.as_ref())
        .fetch("missing", "batch.zip")
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::ContainerNotFound(_)));
    assert!(err.to_string().contains("missing"));

    let err = ArchiveFetcher::new(store.as_ref())
        .fetch("incoming", "batch.zip")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("batch.zip"));
}
