//! Request and response types for the restore collaborators.

use std::fmt;

use bytes::Bytes;
use serde_json::Value;
use tokio::io::AsyncRead;

/// A single indexing operation within a bulk request.
///
/// The document body is carried as raw bytes and handed to the engine
/// untouched; the engine is the one that validates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexOperation {
    /// Destination index name.
    pub index: String,
    /// Document identifier. `None` lets the engine assign one.
    pub id: Option<String>,
    /// Raw JSON document body.
    pub document: Bytes,
}

impl IndexOperation {
    /// Create an operation without an explicit document id.
    pub fn new(index: impl Into<String>, document: Bytes) -> Self {
        Self {
            index: index.into(),
            id: None,
            document,
        }
    }

    /// Set an explicit document id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Structured reason for a rejected bulk item.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkItemFailure {
    /// Index the item was addressed to, as echoed by the engine.
    pub index: Option<String>,
    /// Document id, as echoed by the engine.
    pub id: Option<String>,
    /// Per-item HTTP status.
    pub status: u16,
    /// Engine error type (e.g. `mapper_parsing_exception`).
    pub error_type: Option<String>,
    /// Human-readable reason.
    pub reason: Option<String>,
    /// The raw `error` object from the response.
    pub raw: Value,
}

impl fmt::Display for BulkItemFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "status={} type={} reason={}",
            self.status,
            self.error_type.as_deref().unwrap_or("unknown"),
            self.reason.as_deref().unwrap_or("none")
        )?;
        if let Some(ref id) = self.id {
            write!(f, " id={}", id)?;
        }
        if let Some(ref index) = self.index {
            write!(f, " index={}", index)?;
        }
        Ok(())
    }
}

/// Result of a bulk operation for a single item.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOperationResult {
    /// Position of the operation within the submitted batch.
    pub position: usize,
    /// Whether the operation succeeded.
    pub success: bool,
    /// Failure detail if the operation was rejected.
    pub failure: Option<BulkItemFailure>,
}

impl BatchOperationResult {
    /// A successful item.
    pub fn succeeded(position: usize) -> Self {
        Self {
            position,
            success: true,
            failure: None,
        }
    }

    /// A rejected item.
    pub fn failed(position: usize, failure: BulkItemFailure) -> Self {
        Self {
            position,
            success: false,
            failure: Some(failure),
        }
    }
}

/// Summary of one bulk request: aggregate counts plus per-item results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOperationSummary {
    /// Total number of items in the batch.
    pub total: usize,
    /// Number of successful operations.
    pub succeeded: usize,
    /// Number of failed operations.
    pub failed: usize,
    /// Individual results for each item, in submission order.
    pub results: Vec<BatchOperationResult>,
}

impl BatchOperationSummary {
    /// Build a summary from per-item results.
    pub fn from_results(results: Vec<BatchOperationResult>) -> Self {
        let succeeded = results.iter().filter(|r| r.success).count();
        Self {
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
            results,
        }
    }

    /// Summary of an empty batch.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The first rejected item, if any.
    pub fn first_failure(&self) -> Option<&BulkItemFailure> {
        self.results.iter().find_map(|r| r.failure.as_ref())
    }

    /// Whether any item was rejected.
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// One object from a bucket listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectEntry {
    /// Full object key.
    pub key: String,
    /// Object size in bytes.
    pub size: u64,
}

/// One page of a bucket listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPage {
    /// Objects on this page.
    pub entries: Vec<ObjectEntry>,
    /// Marker to pass to the next `list` call.
    pub next_marker: Option<String>,
    /// Whether more pages follow.
    pub is_truncated: bool,
}

/// Metadata returned by a HEAD check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectHead {
    /// Object size in bytes, when the store reports it.
    pub size: Option<u64>,
}

/// Streaming body of a fetched object.
///
/// Dropping the body releases the underlying connection.
pub struct ObjectBody {
    /// The object bytes.
    pub reader: Box<dyn AsyncRead + Send + Unpin>,
    /// Declared content length, if known.
    pub content_length: Option<u64>,
}

impl fmt::Debug for ObjectBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectBody")
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}
