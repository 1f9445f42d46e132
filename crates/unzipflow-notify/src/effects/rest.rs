use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde_json::json;
use tracing::debug;
use unzipflow_identity::SharedCredential;
use url::Url;

use crate::data::Message;
use crate::effects::client::{MessageSender, MessagingClient, MessagingConnector};
use crate::error::{NotifyError, Result};

/// Token scope requested for messaging calls.
pub const MESSAGING_SCOPE: &str = "https://servicebus.azure.net/.default";

/// Publishes to topics through the namespace's REST endpoint.
pub struct TopicRestConnector {
    client: Client,
    namespace: Url,
}

impl TopicRestConnector {
    pub fn new(namespace: &str) -> Result<Self> {
        let namespace = Url::parse(namespace).map_err(|e| NotifyError::InvalidEndpoint {
            url: namespace.to_string(),
            reason: e.to_string(),
        })?;
        if namespace.cannot_be_a_base() {
            return Err(NotifyError::InvalidEndpoint {
                url: namespace.to_string(),
                reason: "not a hierarchical URL".into(),
            });
        }
        let client = Client::builder()
            .build()
            .map_err(|e| NotifyError::Network(e.to_string()))?;
        Ok(Self { client, namespace })
    }
}

impl MessagingConnector for TopicRestConnector {
    fn connect(&self, credential: &SharedCredential) -> Result<Arc<dyn MessagingClient>> {
        Ok(Arc::new(TopicRestClient {
            client: self.client.clone(),
            namespace: self.namespace.clone(),
            credential: Arc::clone(credential),
            disposed: Arc::new(AtomicBool::new(false)),
        }))
    }
}

struct TopicRestClient {
    client: Client,
    namespace: Url,
    credential: SharedCredential,
    disposed: Arc<AtomicBool>,
}

fn messages_url(namespace: &Url, topic: &str) -> Url {
    let mut url = namespace.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push(topic).push("messages");
    }
    url
}

#[async_trait]
impl MessagingClient for TopicRestClient {
    async fn create_sender(&self, topic: &str) -> Result<Arc<dyn MessageSender>> {
        if self.disposed.load(Ordering::Acquire) {
            return Err(NotifyError::Disposed);
        }
        Ok(Arc::new(TopicRestSender {
            client: self.client.clone(),
            url: messages_url(&self.namespace, topic),
            topic: topic.to_string(),
            credential: Arc::clone(&self.credential),
            disposed: Arc::clone(&self.disposed),
            closed: AtomicBool::new(false),
        }))
    }

    async fn dispose(&self) -> Result<()> {
        self.disposed.store(true, Ordering::Release);
        Ok(())
    }
}

struct TopicRestSender {
    client: Client,
    url: Url,
    topic: String,
    credential: SharedCredential,
    disposed: Arc<AtomicBool>,
    closed: AtomicBool,
}

/// Broker properties and custom attributes, as request headers.
///
/// Attribute values are JSON string literals so the broker types them as
/// strings.
fn message_headers(message: &Message) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    let broker = json!({ "MessageId": message.message_id }).to_string();
    headers.insert(
        HeaderName::from_static("brokerproperties"),
        HeaderValue::from_str(&broker).map_err(|_| NotifyError::InvalidAttribute {
            name: "BrokerProperties".into(),
        })?,
    );
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(message.content_type));

    for (name, value) in &message.attributes {
        let invalid = || NotifyError::InvalidAttribute { name: name.clone() };
        let header = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
        let quoted = serde_json::Value::from(value.as_str()).to_string();
        let value = HeaderValue::from_bytes(quoted.as_bytes()).map_err(|_| invalid())?;
        headers.insert(header, value);
    }
    Ok(headers)
}

#[async_trait]
impl MessageSender for TopicRestSender {
    fn topic(&self) -> &str {
        &self.topic
    }

    async fn send(&self, message: &Message) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(NotifyError::SenderClosed(self.topic.clone()));
        }
        if self.disposed.load(Ordering::Acquire) {
            return Err(NotifyError::Disposed);
        }

        let headers = message_headers(message)?;
        let token = self.credential.get_token(MESSAGING_SCOPE).await?;
        let response = self
            .client
            .post(self.url.clone())
            .header(AUTHORIZATION, token.bearer())
            .headers(headers)
            .body(message.body.clone())
            .send()
            .await
            .map_err(|e| NotifyError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Rejected {
                message_id: message.message_id.clone(),
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }
        debug!(topic = %self.topic, message_id = %message.message_id, "message accepted");
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_url_appends_topic() {
        let namespace = Url::parse("https://ns.servicebus.example/").unwrap();
        assert_eq!(
            messages_url(&namespace, "extracted-files").as_str(),
            "https://ns.servicebus.example/extracted-files/messages"
        );
    }

    #[test]
    fn attributes_become_quoted_headers() {
        let message = Message::json("{}")
            .with_attribute("FileName", "x \"1\".csv")
            .with_attribute("IntId", "INT-42");
        let headers = message_headers(&message).unwrap();

        assert_eq!(headers["intid"], "\"INT-42\"");
        assert_eq!(headers["filename"], "\"x \\\"1\\\".csv\"");
        assert_eq!(headers[CONTENT_TYPE], "application/json");
        let broker = headers["brokerproperties"].to_str().unwrap();
        assert!(broker.contains(&message.message_id));
    }

    #[test]
    fn non_ascii_values_are_sent_as_raw_bytes() {
        let message = Message::json("{}").with_attribute("FileName", "größe.csv");
        let headers = message_headers(&message).unwrap();
        assert_eq!(
            headers["filename"].as_bytes(),
            "\"größe.csv\"".as_bytes()
        );
    }

    #[test]
    fn invalid_attribute_names_are_rejected() {
        let message = Message::json("{}").with_attribute("bad name", "v");
        assert!(matches!(
            message_headers(&message),
            Err(NotifyError::InvalidAttribute { .. })
        ));
    }

    #[test]
    fn endpoint_must_be_a_url() {
        assert!(TopicRestConnector::new("just-a-topic-name").is_err());
    }
}
