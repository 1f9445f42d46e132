//! Zip traversal over an in-memory archive buffer.
//!
//! # Architecture
//!
//! - `reader.rs` - Random-access reader yielding entries in archive order
//! - `stream.rs` - Chunked decompression of one entry off the async runtime
//! - `entry.rs` - Entry classification and leaf names
//! - `target.rs` - Destination object naming

pub use entry::{Entry, EntryKind, leaf_name};
pub use error::{Error, Result};
pub use reader::ArchiveReader;
pub use stream::EntryStream;
pub use target::destination_object_name;

mod entry;
mod error;
mod reader;
mod stream;
mod target;
