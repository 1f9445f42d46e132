//! Fetch, extract, upload and notify.
//!
//! A run is strictly sequential: the archive is buffered, then each file
//! entry is decompressed straight into its upload and only after the upload
//! completes is its notification sent. The first failing entry ends the
//! run; files already uploaded and announced stay where they are.

use std::io;
use std::sync::{Arc, Mutex, PoisonError};

use futures_util::TryStreamExt;
use tracing::{Instrument, debug, info, info_span, warn};
use unzipflow_archive::{ArchiveReader, Entry, Error as ArchiveError, destination_object_name};
use unzipflow_identity::SharedCredential;
use unzipflow_notify::{MessagingConnector, Notification, PublishSession, TransactionId};
use unzipflow_store::{
    ArchiveFetcher, DEFAULT_CHUNK_SIZE, ObjectBody, ObjectStore, StoreConnector, StoreError,
};

use crate::error::RunError;
use crate::report::{PublishedFile, RunReport};
use crate::request::InvocationRequest;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Size of the chunks each entry is streamed to the destination in.
    pub chunk_size: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// The collaborators a run talks to, plus the credential acquired for it.
pub struct Pipeline {
    storage: Arc<dyn StoreConnector>,
    messaging: Arc<dyn MessagingConnector>,
    credential: SharedCredential,
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(
        storage: Arc<dyn StoreConnector>,
        messaging: Arc<dyn MessagingConnector>,
        credential: SharedCredential,
    ) -> Self {
        Self {
            storage,
            messaging,
            credential,
            options: PipelineOptions::default(),
        }
    }

    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    /// Run once for `request`.
    pub async fn run(&self, request: &InvocationRequest) -> Result<RunReport, RunError> {
        let span = info_span!(
            "unzip_run",
            correlation_id = %request.correlation.correlation_id,
            integration_id = %request.correlation.integration_id,
        );
        self.run_inner(request).instrument(span).await
    }

    async fn run_inner(&self, request: &InvocationRequest) -> Result<RunReport, RunError> {
        let source = self
            .storage
            .connect(&request.source_blob_url, &self.credential)
            .map_err(RunError::unknown)?;
        let buffer = ArchiveFetcher::new(source.as_ref())
            .fetch(&request.source_container_name, &request.source_blob_name)
            .await
            .map_err(RunError::from_fetch)?;

        let mut report = RunReport {
            archive_bytes: buffer.len() as u64,
            ..RunReport::default()
        };
        let reader = ArchiveReader::open(buffer)?;
        debug!(entries = reader.len(), "opened archive");

        let destination = self
            .storage
            .connect(&request.destination_blob_url, &self.credential)
            .map_err(RunError::unknown)?;
        let session =
            PublishSession::open(self.messaging.as_ref(), &self.credential, &request.topic_name)
                .await
                .map_err(RunError::Messaging)?;

        let outcome = self
            .publish_entries(reader, destination.as_ref(), &session, request, &mut report)
            .await;
        let released = session.release().await;

        match (outcome, released) {
            (Ok(()), Ok(())) => {
                info!(
                    published = report.published.len(),
                    skipped = report.skipped,
                    "archive extracted"
                );
                Ok(report)
            }
            (Ok(()), Err(e)) => Err(RunError::Messaging(e)),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(cleanup)) => {
                warn!(error = %cleanup, "failed to release publish session after run error");
                Err(e)
            }
        }
    }

    async fn publish_entries(
        &self,
        mut reader: ArchiveReader,
        destination: &dyn ObjectStore,
        session: &PublishSession,
        request: &InvocationRequest,
        report: &mut RunReport,
    ) -> Result<(), RunError> {
        while let Some(entry) = reader.next_entry() {
            let entry = entry?;
            report.entries += 1;

            if !entry.is_file() {
                debug!(entry = %entry.full_name, "skipping non-file entry");
                report.skipped += 1;
                continue;
            }

            let object = destination_object_name(&request.destination_folder_name, &entry.name);
            let bytes = self
                .upload_entry(
                    &reader,
                    &entry,
                    destination,
                    &request.destination_container_name,
                    &object,
                )
                .await?;

            let notification = Notification::for_entry(
                &request.correlation,
                TransactionId::generate(),
                &entry.name,
                &request.source_blob_name,
                &object,
            );
            let message = notification.to_message().map_err(|source| RunError::Publish {
                object: object.clone(),
                source,
            })?;
            session
                .send(&message)
                .await
                .map_err(|source| RunError::Publish {
                    object: object.clone(),
                    source,
                })?;

            info!(
                entry = %entry.full_name,
                object = %object,
                bytes,
                transaction_id = %notification.transaction_id,
                "uploaded and announced"
            );
            report.published.push(PublishedFile {
                entry: entry.full_name,
                object,
                bytes,
                transaction_id: notification.transaction_id,
                message_id: message.message_id,
            });
        }
        Ok(())
    }

    /// Stream one file entry into `object`, decompressing as the upload
    /// consumes it.
    async fn upload_entry(
        &self,
        reader: &ArchiveReader,
        entry: &Entry,
        destination: &dyn ObjectStore,
        container: &str,
        object: &str,
    ) -> Result<u64, RunError> {
        // the store only sees a message; the archive error is kept for classification
        let extraction = Arc::new(Mutex::new(None::<io::Error>));
        let slot = Arc::clone(&extraction);
        let chunks = reader
            .stream_entry(entry, self.options.chunk_size)
            .map_err(move |e| {
                let forwarded = StoreError::Body(e.to_string());
                *slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(e);
                forwarded
            });
        let body = ObjectBody::new(Box::pin(chunks), entry.size);

        match destination.upload(container, object, body, true).await {
            Ok(bytes) => Ok(bytes),
            Err(source) => {
                let failed = extraction
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .take();
                Err(match failed {
                    Some(e) => RunError::Extraction(ArchiveError::ExtractionFailed {
                        entry: entry.full_name.clone(),
                        source: e,
                    }),
                    None => RunError::Upload {
                        object: object.to_string(),
                        source,
                    },
                })
            }
        }
    }
}
