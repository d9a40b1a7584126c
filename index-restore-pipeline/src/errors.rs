//! Error types for the restore pipeline.

use index_restore_repository::{BulkItemFailure, ObjectStoreError, SearchIndexError};
use index_restore_shared::MalformedKey;
use thiserror::Error;

/// Errors that can occur while restoring an archive.
///
/// Every variant except `MalformedEntry` is fatal to an import. None of them
/// is retried implicitly.
#[derive(Error, Debug)]
pub enum RestoreError {
    /// Network or authentication failure talking to the object store or the
    /// search engine.
    #[error("Transport failure: {0}")]
    TransportFailure(String),

    /// Invalid or truncated gzip framing.
    #[error("Corrupt archive: {0}")]
    CorruptArchive(String),

    /// An object key that does not have the `<index>/<project>` shape.
    #[error("Malformed entry: {0}")]
    MalformedEntry(#[from] MalformedKey),

    /// At least one operation of a flushed batch was rejected.
    #[error("{failed} of {total} operations rejected in bulk flush #{flush}: {detail}")]
    PartialIndexFailure {
        /// 1-based sequence number of the flush that failed.
        flush: usize,
        /// Number of rejected operations in that flush.
        failed: usize,
        /// Number of operations in that flush.
        total: usize,
        /// The first rejected operation.
        detail: Box<BulkItemFailure>,
    },

    /// The requested archive does not exist in the bucket.
    #[error("Archive not found: {0}")]
    ArchiveNotFound(String),

    /// Invalid pipeline configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl RestoreError {
    /// Create a transport failure.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::TransportFailure(msg.into())
    }

    /// Create a corrupt archive error.
    pub fn corrupt(msg: impl Into<String>) -> Self {
        Self::CorruptArchive(msg.into())
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Structured detail of the first rejected operation, pretty-printed.
    pub fn failure_detail(&self) -> Option<String> {
        match self {
            Self::PartialIndexFailure { detail, .. } => {
                Some(serde_json::to_string_pretty(&detail.raw).unwrap_or_else(|_| detail.to_string()))
            }
            _ => None,
        }
    }
}

impl From<SearchIndexError> for RestoreError {
    fn from(err: SearchIndexError) -> Self {
        match err {
            SearchIndexError::ConfigError(msg) => Self::InvalidConfig(msg),
            other => Self::TransportFailure(other.to_string()),
        }
    }
}

impl From<ObjectStoreError> for RestoreError {
    fn from(err: ObjectStoreError) -> Self {
        match err {
            ObjectStoreError::NotFound(key) => Self::ArchiveNotFound(key),
            ObjectStoreError::ConfigError(msg) => Self::InvalidConfig(msg),
            other => Self::TransportFailure(other.to_string()),
        }
    }
}
