use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("archive is corrupted: {0}")]
    Corrupted(#[source] zip::result::ZipError),

    #[error("failed to read entry #{index} of the archive: {source}")]
    EntryUnreadable {
        index: usize,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("failed to extract '{entry}': {source}")]
    ExtractionFailed { entry: String, source: io::Error },
}

pub type Result<T> = std::result::Result<T, Error>;
