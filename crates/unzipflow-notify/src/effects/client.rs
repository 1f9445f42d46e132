use std::sync::Arc;

use async_trait::async_trait;
use unzipflow_identity::SharedCredential;

use crate::data::Message;
use crate::error::Result;

/// A connection to a messaging namespace.
#[async_trait]
pub trait MessagingClient: Send + Sync {
    async fn create_sender(&self, topic: &str) -> Result<Arc<dyn MessageSender>>;

    /// Release the connection. Senders created from it stop working.
    async fn dispose(&self) -> Result<()>;
}

/// Sends messages to one topic.
#[async_trait]
pub trait MessageSender: Send + Sync {
    fn topic(&self) -> &str;

    async fn send(&self, message: &Message) -> Result<()>;

    async fn close(&self) -> Result<()>;
}

/// Opens a [`MessagingClient`] authenticated with `credential`.
pub trait MessagingConnector: Send + Sync {
    fn connect(&self, credential: &SharedCredential) -> Result<Arc<dyn MessagingClient>>;
}
