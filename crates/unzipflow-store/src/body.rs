use std::pin::Pin;

use bytes::Bytes;
use futures_util::{Stream, TryStreamExt};

use crate::error::{Result, StoreError};

/// Default upload chunk size (4 MiB).
pub const DEFAULT_CHUNK_SIZE: usize = 4 * 1024 * 1024;

/// A boxed stream type for object bodies.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// Chunks of an object body as they arrive or are produced.
pub type ByteStream = BoxStream<'static, Result<Bytes>>;

/// A streamed upload body with a known total length.
pub struct ObjectBody {
    stream: ByteStream,
    length: u64,
}

impl ObjectBody {
    pub fn new(stream: ByteStream, length: u64) -> Self {
        Self { stream, length }
    }

    /// Stream an in-memory buffer in slices of at most `chunk_size` bytes.
    ///
    /// Slices share the buffer's allocation.
    pub fn chunked(data: Bytes, chunk_size: usize) -> Self {
        let length = data.len() as u64;
        let chunk_size = chunk_size.max(1);
        let chunks: Vec<Result<Bytes>> = (0..data.len())
            .step_by(chunk_size)
            .map(|start| Ok(data.slice(start..(start + chunk_size).min(data.len()))))
            .collect();
        Self {
            stream: Box::pin(futures_util::stream::iter(chunks)),
            length,
        }
    }

    pub fn len(&self) -> u64 {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn into_stream(self) -> ByteStream {
        self.stream
    }

    /// Drain the body, failing if it does not match the declared length.
    pub async fn collect(self) -> Result<Bytes> {
        let chunks = self.collect_chunks().await?;
        Ok(Bytes::from(chunks.concat()))
    }

    /// Drain the body chunk by chunk, as produced.
    pub(crate) async fn collect_chunks(self) -> Result<Vec<Bytes>> {
        let declared = self.length;
        let chunks: Vec<Bytes> = self.stream.try_collect().await?;
        let streamed = chunks.iter().map(|chunk| chunk.len() as u64).sum::<u64>();
        if streamed != declared {
            return Err(StoreError::LengthMismatch { declared, streamed });
        }
        Ok(chunks)
    }
}

impl std::fmt::Debug for ObjectBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectBody")
            .field("length", &self.length)
            .finish_non_exhaustive()
    }
}
