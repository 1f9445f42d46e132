use bytes::Bytes;
use uuid::Uuid;

/// A message as handed to a topic sender.
///
/// `attributes` are broker-level properties consumers can filter on
/// without reading the body. Order is preserved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub message_id: String,
    pub content_type: &'static str,
    pub body: Bytes,
    pub attributes: Vec<(String, String)>,
}

impl Message {
    /// A JSON message with a freshly generated message id.
    pub fn json(body: impl Into<Bytes>) -> Self {
        Self {
            message_id: Uuid::new_v4().to_string(),
            content_type: "application/json",
            body: body.into(),
            attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}
