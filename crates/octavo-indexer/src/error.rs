//! Error taxonomy for the indexing pipeline
//!
//! Fatal: configuration problems (bad mapping, bad field name) and batch
//! write failures stop the run. Skippable: not-found record
//! lookups. Logged-only: stream notify and suppression-delete failures.

use octavo_model::MappingError;

#[derive(Debug)]
pub enum Error {
    /// Missing/invalid configuration or mapping. Aborts the process.
    Config(String),
    /// Store failure that is not record-specific. Aborts the run.
    Store(String),
    /// A single id could not be found. Log and skip, never fatal.
    StoreNotFound(String),
    /// Bulk write reported errors. Fatal to the run (all-or-nothing).
    IndexWrite(String),
    /// Delete against the index failed for a non-404 reason.
    Delete(String),
    /// Stream notification failed. Logged only, never fails a batch.
    Notify(String),
    Io(std::io::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Store(msg) => write!(f, "store: {msg}"),
            Self::StoreNotFound(id) => write!(f, "store: {id} not found"),
            Self::IndexWrite(msg) => write!(f, "index write: {msg}"),
            Self::Delete(msg) => write!(f, "index delete: {msg}"),
            Self::Notify(msg) => write!(f, "stream notify: {msg}"),
            Self::Io(e) => write!(f, "IO: {e}"),
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Whether this error should stop the whole run.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Config(_) | Self::Store(_) | Self::IndexWrite(_) | Self::Io(_) => true,
            Self::StoreNotFound(_) | Self::Delete(_) | Self::Notify(_) => false,
        }
    }
}

impl From<MappingError> for Error {
    fn from(e: MappingError) -> Self {
        Self::Config(e.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
