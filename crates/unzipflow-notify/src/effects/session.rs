use std::sync::Arc;

use tracing::{debug, warn};
use unzipflow_identity::SharedCredential;

use crate::data::Message;
use crate::effects::client::{MessageSender, MessagingClient, MessagingConnector};
use crate::error::Result;

/// One connection and one topic sender, held for the length of a run.
///
/// [`release`](Self::release) closes the sender and then disposes the
/// connection. A session dropped without being released (an early return,
/// a panic, or the run future being cancelled) schedules the same cleanup on
/// the current tokio runtime.
pub struct PublishSession {
    client: Arc<dyn MessagingClient>,
    sender: Arc<dyn MessageSender>,
    released: bool,
}

impl PublishSession {
    pub async fn open(
        connector: &dyn MessagingConnector,
        credential: &SharedCredential,
        topic: &str,
    ) -> Result<Self> {
        let client = connector.connect(credential)?;
        let sender = match client.create_sender(topic).await {
            Ok(sender) => sender,
            Err(e) => {
                if let Err(dispose) = client.dispose().await {
                    warn!(topic, error = %dispose, "failed to dispose messaging connection");
                }
                return Err(e);
            }
        };
        debug!(topic, "opened publish session");
        Ok(Self {
            client,
            sender,
            released: false,
        })
    }

    pub fn topic(&self) -> &str {
        self.sender.topic()
    }

    pub async fn send(&self, message: &Message) -> Result<()> {
        self.sender.send(message).await
    }

    /// Close the sender, then dispose the connection.
    ///
    /// Both steps run even if the first fails; the first error is returned.
    pub async fn release(mut self) -> Result<()> {
        self.released = true;
        shutdown(Arc::clone(&self.client), Arc::clone(&self.sender)).await
    }
}

async fn shutdown(client: Arc<dyn MessagingClient>, sender: Arc<dyn MessageSender>) -> Result<()> {
    let closed = sender.close().await;
    let disposed = client.dispose().await;
    debug!(topic = sender.topic(), "released publish session");
    match (closed, disposed) {
        (Err(e), Err(dispose)) => {
            warn!(error = %dispose, "failed to dispose messaging connection");
            Err(e)
        }
        (Err(e), Ok(())) | (Ok(()), Err(e)) => Err(e),
        (Ok(()), Ok(())) => Ok(()),
    }
}

impl Drop for PublishSession {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        let client = Arc::clone(&self.client);
        let sender = Arc::clone(&self.sender);
        let topic = sender.topic().to_string();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                debug!(topic = %topic, "publish session dropped unreleased, scheduling cleanup");
                handle.spawn(async move {
                    if let Err(e) = shutdown(client, sender).await {
                        warn!(topic = %topic, error = %e, "background session cleanup failed");
                    }
                });
            }
            Err(_) => warn!(topic = %topic, "publish session dropped outside a runtime, cleanup skipped"),
        }
    }
}

impl std::fmt::Debug for PublishSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublishSession")
            .field("topic", &self.sender.topic())
            .field("released", &self.released)
            .finish()
    }
}
