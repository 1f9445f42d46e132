use std::io::{self, Cursor, Read};
use std::pin::Pin;

use bytes::Bytes;
use futures_util::Stream;
use tokio::sync::mpsc;
use tracing::trace;
use zip::ZipArchive;

/// Decompressed chunks of one file entry.
pub type EntryStream = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send>>;

/// Chunks decompressed ahead of the consumer.
const READ_AHEAD: usize = 2;

/// Decompress entry `index` on the blocking pool, handing chunks over a
/// bounded channel.
///
/// The stream fails if the entry produces more or fewer bytes than
/// `declared`. Dropping the stream stops decompression at the next chunk.
pub(crate) fn spawn(
    archive: ZipArchive<Cursor<Bytes>>,
    index: usize,
    declared: u64,
    chunk_size: usize,
) -> EntryStream {
    let (tx, rx) = mpsc::channel(READ_AHEAD);
    let chunk_size = chunk_size.max(1);

    tokio::task::spawn_blocking(move || {
        let mut archive = archive;
        if let Err(e) = pump(&mut archive, index, declared, chunk_size, &tx) {
            trace!(index, error = %e, "entry extraction failed");
            if tx.blocking_send(Err(e)).is_err() {
                trace!(index, "entry stream dropped before its error was read");
            }
        }
    });

    Box::pin(futures_util::stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|item| (item, rx))
    }))
}

fn pump(
    archive: &mut ZipArchive<Cursor<Bytes>>,
    index: usize,
    declared: u64,
    chunk_size: usize,
    tx: &mpsc::Sender<io::Result<Bytes>>,
) -> io::Result<()> {
    let mut file = archive.by_index(index)?;
    let mut produced: u64 = 0;

    loop {
        let mut chunk = Vec::with_capacity(chunk_size);
        let read = (&mut file).take(chunk_size as u64).read_to_end(&mut chunk)?;
        if read == 0 {
            break;
        }
        produced += read as u64;
        if produced > declared {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("entry holds more than its declared {declared} bytes"),
            ));
        }
        if tx.blocking_send(Ok(Bytes::from(chunk))).is_err() {
            return Ok(());
        }
    }

    if produced < declared {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("entry ended after {produced} of {declared} declared bytes"),
        ));
    }
    Ok(())
}
