use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::data::message::Message;
use crate::error::Result;

/// Caller-supplied lineage shared by every message of one run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correlation {
    #[serde(rename = "CorrelationId")]
    pub correlation_id: String,
    #[serde(rename = "IntId")]
    pub integration_id: String,
    #[serde(rename = "EventType")]
    pub event_type: String,
    #[serde(rename = "ZipFileName")]
    pub archive_file_name: String,
}

/// Per-file identifier: `TRANS` followed by an upper-case v4 UUID.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    pub fn generate() -> Self {
        Self(format!("TRANS{}", Uuid::new_v4().to_string().to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Announces one extracted file at its destination.
///
/// Field order is the serialized key order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Notification {
    #[serde(rename = "IntId")]
    pub integration_id: String,
    pub transaction_id: TransactionId,
    pub correlation_id: String,
    pub file_name: String,
    pub archive_blob_full_path: String,
    pub zip_file_name: String,
    pub event_type: String,
    pub unzip_blob_full_path: String,
}

impl Notification {
    /// Build the notification for a file that has already been uploaded.
    pub fn for_entry(
        correlation: &Correlation,
        transaction_id: TransactionId,
        file_name: &str,
        archive_object: &str,
        destination_object: &str,
    ) -> Self {
        Self {
            integration_id: correlation.integration_id.clone(),
            transaction_id,
            correlation_id: correlation.correlation_id.clone(),
            file_name: file_name.to_string(),
            archive_blob_full_path: archive_object.to_string(),
            zip_file_name: correlation.archive_file_name.clone(),
            event_type: correlation.event_type.clone(),
            unzip_blob_full_path: destination_object.to_string(),
        }
    }

    /// The body fields as `(key, value)` pairs, in body order.
    pub fn attributes(&self) -> [(&'static str, &str); 8] {
        [
            ("IntId", self.integration_id.as_str()),
            ("TransactionId", self.transaction_id.as_str()),
            ("CorrelationId", self.correlation_id.as_str()),
            ("FileName", self.file_name.as_str()),
            ("ArchiveBlobFullPath", self.archive_blob_full_path.as_str()),
            ("ZipFileName", self.zip_file_name.as_str()),
            ("EventType", self.event_type.as_str()),
            ("UnzipBlobFullPath", self.unzip_blob_full_path.as_str()),
        ]
    }

    /// JSON body plus the same fields mirrored as attributes.
    pub fn to_message(&self) -> Result<Message> {
        let body = serde_json::to_vec(self)?;
        Ok(self
            .attributes()
            .into_iter()
            .fold(Message::json(body), |message, (name, value)| {
                message.with_attribute(name, value)
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn correlation() -> Correlation {
        Correlation {
            correlation_id: "corr-1".into(),
            integration_id: "INT-42".into(),
            event_type: "ShipmentFiles".into(),
            archive_file_name: "batch.zip".into(),
        }
    }

    fn notification() -> Notification {
        Notification::for_entry(
            &correlation(),
            TransactionId::generate(),
            "x.csv",
            "incoming/batch.zip",
            "drop/x.csv",
        )
    }

    #[test]
    fn transaction_id_shape() {
        let id = TransactionId::generate();
        let uuid = id.as_str().strip_prefix("TRANS").unwrap();
        assert_eq!(uuid, uuid.to_uppercase());
        assert!(Uuid::parse_str(uuid).is_ok());
        assert_ne!(id, TransactionId::generate());
    }

    #[test]
    fn body_keys_and_order() {
        let json = serde_json::to_string(&notification()).unwrap();
        let keys = [
            "\"IntId\"",
            "\"TransactionId\"",
            "\"CorrelationId\"",
            "\"FileName\"",
            "\"ArchiveBlobFullPath\"",
            "\"ZipFileName\"",
            "\"EventType\"",
            "\"UnzipBlobFullPath\"",
        ];
        let positions: Vec<usize> = keys.iter().map(|k| json.find(k).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{json}");
    }

    #[test]
    fn attributes_mirror_body() {
        let notification = notification();
        let message = notification.to_message().unwrap();
        let body: serde_json::Value = serde_json::from_slice(&message.body).unwrap();

        assert_eq!(message.attributes.len(), 8);
        for (name, value) in &message.attributes {
            assert_eq!(body[name.as_str()], serde_json::Value::from(value.as_str()));
        }
        assert_eq!(message.attribute("UnzipBlobFullPath"), Some("drop/x.csv"));
        assert_eq!(message.attribute("ArchiveBlobFullPath"), Some("incoming/batch.zip"));
        assert_eq!(message.attribute("ZipFileName"), Some("batch.zip"));
    }

    #[test]
    fn message_id_differs_from_transaction_id() {
        let notification = notification();
        let message = notification.to_message().unwrap();
        assert_ne!(message.message_id, notification.transaction_id.as_str());
    }

    #[test]
    fn correlation_reads_pascal_case() {
        let parsed: Correlation = serde_json::from_str(
            r#"{"CorrelationId":"corr-1","IntId":"INT-42","EventType":"ShipmentFiles","ZipFileName":"batch.zip"}"#,
        )
        .unwrap();
        assert_eq!(parsed, correlation());
    }
}
