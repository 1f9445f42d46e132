//! Immutable message types.

mod message;
mod notification;

pub use message::Message;
pub use notification::{Correlation, Notification, TransactionId};
