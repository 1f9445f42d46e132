//! Notification messages for extracted files, and the topic publishing
//! they go through.
//!
//! # Architecture
//!
//! - [`data`] - message model: correlation metadata, transaction ids, notifications
//! - [`effects`] - messaging client traits, the scoped [`PublishSession`], backends

pub mod data;
pub mod effects;
mod error;

pub use data::{Correlation, Message, Notification, TransactionId};
pub use effects::{
    MemoryBus, MessageSender, MessagingClient, MessagingConnector, PublishSession, SentMessage,
};
#[cfg(feature = "reqwest")]
pub use effects::{MESSAGING_SCOPE, TopicRestConnector};
pub use error::{NotifyError, Result};
