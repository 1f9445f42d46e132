use std::io::Cursor;

use bytes::Bytes;
use tracing::trace;

use crate::entry::Entry;
use crate::error::{Error, Result};
use crate::stream::{self, EntryStream};

/// Random-access reader over a fully buffered zip archive.
///
/// Entries come out in central-directory order and carry metadata only.
/// Contents of a file entry are decompressed on demand by
/// [`ArchiveReader::stream_entry`].
pub struct ArchiveReader {
    archive: zip::ZipArchive<Cursor<Bytes>>,
    index: usize,
}

impl ArchiveReader {
    pub fn open(buffer: Bytes) -> Result<Self> {
        let archive = zip::ZipArchive::new(Cursor::new(buffer)).map_err(Error::Corrupted)?;
        Ok(Self { archive, index: 0 })
    }

    pub fn len(&self) -> usize {
        self.archive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archive.len() == 0
    }

    pub fn next_entry(&mut self) -> Option<Result<Entry>> {
        if self.index >= self.archive.len() {
            return None;
        }
        let index = self.index;
        self.index += 1;
        Some(self.read_entry(index))
    }

    fn read_entry(&mut self, index: usize) -> Result<Entry> {
        let file = self
            .archive
            .by_index(index)
            .map_err(|source| Error::EntryUnreadable { index, source })?;

        let entry = Entry::classify(index, file.name().to_string(), file.size(), file.is_dir());
        trace!(index, name = %entry.full_name, size = entry.size, file = entry.is_file(), "read entry");
        Ok(entry)
    }

    /// Stream the decompressed contents of `entry` in chunks of at most
    /// `chunk_size` bytes.
    ///
    /// Decompression runs on tokio's blocking pool, so this must be called
    /// from within a runtime. The stream yields an error if the entry's
    /// data disagrees with the size its header declares.
    pub fn stream_entry(&self, entry: &Entry, chunk_size: usize) -> EntryStream {
        // clones share the parsed central directory and the buffer
        stream::spawn(self.archive.clone(), entry.index, entry.size, chunk_size)
    }
}

impl Iterator for ArchiveReader {
    type Item = Result<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_entry()
    }
}
