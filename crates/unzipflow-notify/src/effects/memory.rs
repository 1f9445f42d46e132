//! In-process message bus for tests and embedding.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use unzipflow_identity::SharedCredential;

use crate::data::Message;
use crate::effects::client::{MessageSender, MessagingClient, MessagingConnector};
use crate::error::{NotifyError, Result};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SentMessage {
    pub topic: String,
    pub message: Message,
}

type SendHook = Arc<dyn Fn(&SentMessage) + Send + Sync>;

#[derive(Default)]
struct State {
    sent: Vec<SentMessage>,
    lifecycle: Vec<String>,
    send_attempts: usize,
    fail_send_at: Option<usize>,
    fail_create_sender: bool,
    disposed: bool,
}

/// Records every message and every connection lifecycle step.
///
/// Clones share state, so a test keeps one handle while the pipeline uses
/// another.
#[derive(Clone, Default)]
pub struct MemoryBus {
    state: Arc<Mutex<State>>,
    on_send: Option<SendHook>,
}

impl MemoryBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `hook` for each message just before it is recorded as sent.
    pub fn on_send(mut self, hook: impl Fn(&SentMessage) + Send + Sync + 'static) -> Self {
        self.on_send = Some(Arc::new(hook));
        self
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.lock().sent.clone()
    }

    /// `connect`, `create_sender:<topic>`, `close:<topic>` and `dispose`, in order.
    pub fn lifecycle(&self) -> Vec<String> {
        self.lock().lifecycle.clone()
    }

    pub fn is_disposed(&self) -> bool {
        self.lock().disposed
    }

    /// Make the `attempt`-th send (1-based) fail.
    pub fn fail_send_at(&self, attempt: usize) {
        self.lock().fail_send_at = Some(attempt);
    }

    pub fn fail_create_sender(&self) {
        self.lock().fail_create_sender = true;
    }
}

impl MessagingConnector for MemoryBus {
    fn connect(&self, _credential: &SharedCredential) -> Result<Arc<dyn MessagingClient>> {
        let mut state = self.lock();
        state.lifecycle.push("connect".into());
        state.disposed = false;
        Ok(Arc::new(MemoryClient { bus: self.clone() }))
    }
}

struct MemoryClient {
    bus: MemoryBus,
}

#[async_trait]
impl MessagingClient for MemoryClient {
    async fn create_sender(&self, topic: &str) -> Result<Arc<dyn MessageSender>> {
        let mut state = self.bus.lock();
        if state.disposed {
            return Err(NotifyError::Disposed);
        }
        if state.fail_create_sender {
            return Err(NotifyError::Injected(format!(
                "topic '{topic}' rejected by test bus"
            )));
        }
        state.lifecycle.push(format!("create_sender:{topic}"));
        Ok(Arc::new(MemorySender {
            bus: self.bus.clone(),
            topic: topic.to_string(),
            closed: AtomicBool::new(false),
        }))
    }

    async fn dispose(&self) -> Result<()> {
        let mut state = self.bus.lock();
        state.lifecycle.push("dispose".into());
        state.disposed = true;
        Ok(())
    }
}

struct MemorySender {
    bus: MemoryBus,
    topic: String,
    closed: AtomicBool,
}

#[async_trait]
impl MessageSender for MemorySender {
    fn topic(&self) -> &str {
        &self.topic
    }

    async fn send(&self, message: &Message) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(NotifyError::SenderClosed(self.topic.clone()));
        }
        {
            let mut state = self.bus.lock();
            if state.disposed {
                return Err(NotifyError::Disposed);
            }
            state.send_attempts += 1;
            if state.fail_send_at == Some(state.send_attempts) {
                return Err(NotifyError::Injected(format!(
                    "message '{}' rejected by test bus",
                    message.message_id
                )));
            }
        }

        let sent = SentMessage {
            topic: self.topic.clone(),
            message: message.clone(),
        };
        if let Some(hook) = &self.bus.on_send {
            hook(&sent);
        }
        self.bus.lock().sent.push(sent);
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::Release);
        self.bus.lock().lifecycle.push(format!("close:{}", self.topic));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unzipflow_identity::StaticCredential;

    async fn sender(bus: &MemoryBus) -> (Arc<dyn MessagingClient>, Arc<dyn MessageSender>) {
        let credential: SharedCredential = Arc::new(StaticCredential::new("t"));
        let client = bus.connect(&credential).unwrap();
        let sender = client.create_sender("files").await.unwrap();
        (client, sender)
    }

    #[tokio::test]
    async fn closed_sender_refuses_messages() {
        let bus = MemoryBus::new();
        let (_client, sender) = sender(&bus).await;
        sender.close().await.unwrap();

        let err = sender.send(&Message::json("{}")).await.unwrap_err();
        assert!(matches!(err, NotifyError::SenderClosed(ref t) if t == "files"));
        assert!(bus.sent().is_empty());
    }

    #[tokio::test]
    async fn disposed_connection_refuses_messages() {
        let bus = MemoryBus::new();
        let (client, sender) = sender(&bus).await;
        client.dispose().await.unwrap();

        let err = sender.send(&Message::json("{}")).await.unwrap_err();
        assert!(matches!(err, NotifyError::Disposed));
    }

    #[tokio::test]
    async fn injected_send_failure_records_nothing() {
        let bus = MemoryBus::new();
        bus.fail_send_at(1);
        let (_client, sender) = sender(&bus).await;

        assert!(sender.send(&Message::json("{}")).await.is_err());
        assert!(sender.send(&Message::json("{}")).await.is_ok());
        assert_eq!(bus.sent().len(), 1);
    }

    #[tokio::test]
    async fn hook_sees_each_message() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let record = Arc::clone(&seen);
        let bus = MemoryBus::new().on_send(move |sent| {
            record.lock().unwrap().push(sent.message.message_id.clone());
        });
        let (_client, sender) = sender(&bus).await;
        let message = Message::json("{}");
        sender.send(&message).await.unwrap();

        assert_eq!(*seen.lock().unwrap(), [message.message_id]);
    }
}
