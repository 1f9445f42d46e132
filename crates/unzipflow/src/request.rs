//! Invocation parameters.

use serde::{Deserialize, Serialize};
use unzipflow_notify::Correlation;

/// Everything one run needs. Supplied by the host and never modified.
///
/// The JSON form uses the host's PascalCase keys, with the correlation
/// fields inline.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationRequest {
    #[serde(rename = "SourceBlobUrl")]
    pub source_blob_url: String,
    #[serde(rename = "DestinationBlobUrl")]
    pub destination_blob_url: String,
    #[serde(rename = "SourceContainerName")]
    pub source_container_name: String,
    #[serde(rename = "DestinationContainerName")]
    pub destination_container_name: String,
    #[serde(rename = "SourceBlobName")]
    pub source_blob_name: String,
    #[serde(rename = "DestinationFolderName")]
    pub destination_folder_name: String,
    #[serde(rename = "TopicName")]
    pub topic_name: String,
    #[serde(flatten)]
    pub correlation: Correlation,
}

impl InvocationRequest {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
