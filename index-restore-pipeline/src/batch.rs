//! Accumulation of records into bulk operations.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use index_restore_repository::IndexOperation;
use sha2::{Digest, Sha256};

use crate::errors::RestoreError;

/// How document ids are assigned to restored records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdStrategy {
    /// No `_id` is sent; the engine generates one per document.
    #[default]
    EngineAssigned,
    /// `_id` is the hex SHA-256 of the record, so a repeated restore
    /// overwrites documents instead of duplicating them.
    ContentHash,
}

impl IdStrategy {
    /// Document id for a record under this strategy.
    pub fn document_id(&self, record: &[u8]) -> Option<String> {
        match self {
            Self::EngineAssigned => None,
            Self::ContentHash => Some(hex::encode(Sha256::digest(record))),
        }
    }
}

impl FromStr for IdStrategy {
    type Err = RestoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::EngineAssigned),
            "content-hash" => Ok(Self::ContentHash),
            other => Err(RestoreError::invalid_config(format!(
                "unknown id strategy '{}', expected 'auto' or 'content-hash'",
                other
            ))),
        }
    }
}

impl fmt::Display for IdStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EngineAssigned => write!(f, "auto"),
            Self::ContentHash => write!(f, "content-hash"),
        }
    }
}

/// Operations waiting for the next flush, in record order.
#[derive(Debug, Default)]
pub struct PendingBatch {
    pub operations: Vec<IndexOperation>,
}

impl PendingBatch {
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

/// Turns records into index operations for one target index.
///
/// The pending batch is created on the first record and handed out whole
/// by [`BatchAccumulator::take`].
#[derive(Debug)]
pub struct BatchAccumulator {
    index: String,
    id_strategy: IdStrategy,
    pending: Option<PendingBatch>,
}

impl BatchAccumulator {
    pub fn new(index: impl Into<String>, id_strategy: IdStrategy) -> Self {
        Self {
            index: index.into(),
            id_strategy,
            pending: None,
        }
    }

    /// Append a record. Blank records are discarded.
    ///
    /// Returns whether an operation was appended.
    pub fn push(&mut self, record: &[u8]) -> bool {
        if record.is_empty() {
            return false;
        }

        let mut operation = IndexOperation::new(self.index.as_str(), Bytes::copy_from_slice(record));
        if let Some(id) = self.id_strategy.document_id(record) {
            operation = operation.with_id(id);
        }

        self.pending
            .get_or_insert_with(PendingBatch::default)
            .operations
            .push(operation);
        true
    }

    /// Number of operations in the pending batch.
    pub fn len(&self) -> usize {
        self.pending.as_ref().map_or(0, PendingBatch::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a pending batch exists.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Remove and return the pending batch.
    pub fn take(&mut self) -> Option<PendingBatch> {
        self.pending.take()
    }

    pub fn index(&self) -> &str {
        &self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_record_does_not_create_batch() {
        let mut acc = BatchAccumulator::new("logs", IdStrategy::EngineAssigned);
        assert!(!acc.push(b""));
        assert!(!acc.has_pending());
        assert!(acc.take().is_none());
    }

    #[test]
    fn test_push_preserves_order_and_bytes() {
        let mut acc = BatchAccumulator::new("logs", IdStrategy::EngineAssigned);
        acc.push(b"{\"n\":1}");
        acc.push(b"{\"n\":2}");
        assert_eq!(acc.len(), 2);

        let batch = acc.take().unwrap();
        assert_eq!(batch.operations[0].document.as_ref(), b"{\"n\":1}");
        assert_eq!(batch.operations[1].document.as_ref(), b"{\"n\":2}");
        assert!(batch.operations.iter().all(|op| op.index == "logs" && op.id.is_none()));
        assert_eq!(acc.len(), 0);
        assert!(!acc.has_pending());
    }

    #[test]
    fn test_content_hash_ids_are_stable() {
        let mut acc = BatchAccumulator::new("logs", IdStrategy::ContentHash);
        acc.push(b"{\"n\":1}");
        acc.push(b"{\"n\":1}");
        acc.push(b"{\"n\":2}");

        let ops = acc.take().unwrap().operations;
        let id = ops[0].id.as_deref().unwrap();
        assert_eq!(id.len(), 64);
        assert_eq!(ops[0].id, ops[1].id);
        assert_ne!(ops[0].id, ops[2].id);
    }

    #[test]
    fn test_id_strategy_parsing() {
        assert_eq!("auto".parse::<IdStrategy>().unwrap(), IdStrategy::EngineAssigned);
        assert_eq!("content-hash".parse::<IdStrategy>().unwrap(), IdStrategy::ContentHash);
        assert!(matches!(
            "uuid".parse::<IdStrategy>(),
            Err(RestoreError::InvalidConfig(_))
        ));
        assert_eq!(IdStrategy::ContentHash.to_string(), "content-hash");
    }
}
