//! Topic publishing.

mod client;
mod memory;
#[cfg(feature = "reqwest")]
mod rest;
mod session;

pub use client::{MessageSender, MessagingClient, MessagingConnector};
pub use memory::{MemoryBus, SentMessage};
#[cfg(feature = "reqwest")]
pub use rest::{MESSAGING_SCOPE, TopicRestConnector};
pub use session::PublishSession;
