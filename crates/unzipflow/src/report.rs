use serde::Serialize;
use unzipflow_notify::TransactionId;

/// What a successful run did.
#[derive(Clone, Debug, Default, Serialize)]
pub struct RunReport {
    pub archive_bytes: u64,
    /// Entries read from the archive, files or not.
    pub entries: usize,
    pub skipped: usize,
    pub published: Vec<PublishedFile>,
}

/// One uploaded and announced file.
#[derive(Clone, Debug, Serialize)]
pub struct PublishedFile {
    pub entry: String,
    pub object: String,
    pub bytes: u64,
    pub transaction_id: TransactionId,
    pub message_id: String,
}
