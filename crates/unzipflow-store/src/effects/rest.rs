use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use futures_util::TryStreamExt;
use reqwest::header::{AUTHORIZATION, CONTENT_LENGTH, IF_NONE_MATCH};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use tracing::debug;
use unzipflow_identity::SharedCredential;
use url::Url;

use crate::body::{ByteStream, ObjectBody};
use crate::effects::store::{ObjectStore, StoreConnector};
use crate::error::{Result, StoreError};

/// Token scope requested for storage calls.
pub const STORAGE_SCOPE: &str = "https://storage.azure.com/.default";

pub const DEFAULT_API_VERSION: &str = "2021-08-06";

/// Connects to blob services over their REST protocol.
pub struct BlobRestConnector {
    client: Client,
    api_version: String,
}

impl BlobRestConnector {
    pub fn new(api_version: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| StoreError::Network(e.to_string()))?;
        Ok(Self {
            client,
            api_version: api_version.into(),
        })
    }
}

impl StoreConnector for BlobRestConnector {
    fn connect(
        &self,
        service_url: &str,
        credential: &SharedCredential,
    ) -> Result<Arc<dyn ObjectStore>> {
        let base = Url::parse(service_url).map_err(|e| StoreError::InvalidUrl {
            url: service_url.to_string(),
            reason: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(StoreError::InvalidUrl {
                url: service_url.to_string(),
                reason: "not a hierarchical URL".into(),
            });
        }
        Ok(Arc::new(BlobRestStore {
            client: self.client.clone(),
            base,
            credential: Arc::clone(credential),
            api_version: self.api_version.clone(),
        }))
    }
}

struct BlobRestStore {
    client: Client,
    base: Url,
    credential: SharedCredential,
    api_version: String,
}

impl BlobRestStore {
    fn container_url(&self, container: &str) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(container);
        }
        url.query_pairs_mut().append_pair("restype", "container");
        url
    }

    fn object_url(&self, container: &str, name: &str) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push(container)
                .extend(name.split('/'));
        }
        url
    }

    async fn request(&self, method: Method, url: Url) -> Result<RequestBuilder> {
        let token = self.credential.get_token(STORAGE_SCOPE).await?;
        let date = chrono::Utc::now()
            .format("%a, %d %b %Y %H:%M:%S GMT")
            .to_string();
        Ok(self
            .client
            .request(method, url)
            .header(AUTHORIZATION, token.bearer())
            .header("x-ms-version", &self.api_version)
            .header("x-ms-date", date))
    }

    async fn exists(&self, url: Url) -> Result<bool> {
        let response = self
            .request(Method::HEAD, url)
            .await?
            .send()
            .await
            .map_err(network)?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            _ => Err(status_error(response).await),
        }
    }
}

fn network(e: reqwest::Error) -> StoreError {
    StoreError::Network(e.to_string())
}

async fn status_error(response: Response) -> StoreError {
    let status = response.status().as_u16();
    let message = response
        .headers()
        .get("x-ms-error-code")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let message = match message {
        Some(code) => code,
        None => response.text().await.unwrap_or_default(),
    };
    StoreError::Status { status, message }
}

#[async_trait]
impl ObjectStore for BlobRestStore {
    async fn container_exists(&self, container: &str) -> Result<bool> {
        self.exists(self.container_url(container)).await
    }

    async fn object_exists(&self, container: &str, name: &str) -> Result<bool> {
        self.exists(self.object_url(container, name)).await
    }

    async fn download(&self, container: &str, name: &str) -> Result<ByteStream> {
        let response = self
            .request(Method::GET, self.object_url(container, name))
            .await?
            .send()
            .await
            .map_err(network)?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        Ok(Box::pin(response.bytes_stream().map_err(network)))
    }

    async fn upload(
        &self,
        container: &str,
        name: &str,
        body: ObjectBody,
        overwrite: bool,
    ) -> Result<u64> {
        let length = body.len();
        let streamed = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&streamed);
        let stream = body.into_stream().inspect_ok(move |chunk| {
            counter.fetch_add(chunk.len() as u64, Ordering::Relaxed);
        });

        let mut request = self
            .request(Method::PUT, self.object_url(container, name))
            .await?
            .header("x-ms-blob-type", "BlockBlob")
            .header(CONTENT_LENGTH, length)
            .body(reqwest::Body::wrap_stream(stream));
        if !overwrite {
            request = request.header(IF_NONE_MATCH, "*");
        }

        let response = request.send().await.map_err(network)?;
        match response.status() {
            status if status.is_success() => {
                let bytes = streamed.load(Ordering::Relaxed);
                debug!(container, object = name, bytes, "blob written");
                Ok(bytes)
            }
            StatusCode::CONFLICT | StatusCode::PRECONDITION_FAILED if !overwrite => {
                Err(StoreError::AlreadyExists {
                    container: container.to_string(),
                    name: name.to_string(),
                })
            }
            _ => Err(status_error(response).await),
        }
    }
}
