//! # Index Restore Pipeline
//!
//! This crate provides the streaming import pipeline that restores a search
//! index from a gzip-compressed NDJSON archive.
//!
//! ## Architecture
//!
//! One import is a single pass over the archive:
//!
//! 1. **Reader**: counts compressed bytes and inflates the gzip stream
//! 2. **Framer**: splits the decompressed stream into trimmed lines
//! 3. **Batch**: turns non-blank lines into index operations
//! 4. **Commit**: flushes a batch to the search engine at the threshold
//!    and once more at end of stream
//! 5. **Progress**: reports bytes consumed against the archive size
//!
//! The **Importer** wires these together for one stream and the **Catalog**
//! locates archives in the object store.

pub mod batch;
pub mod catalog;
pub mod commit;
pub mod errors;
pub mod framer;
pub mod importer;
pub mod progress;
pub mod reader;

#[cfg(test)]
pub(crate) mod testing;

pub use batch::{BatchAccumulator, IdStrategy, PendingBatch};
pub use catalog::{ArchiveCatalog, ArchiveMatch};
pub use commit::{
    should_flush, CommitController, CommitState, CommitStats, RetryPolicy, DEFAULT_BATCH_SIZE,
};
pub use errors::RestoreError;
pub use framer::LineFramer;
pub use importer::{ArchiveImporter, ImportConfig, ImportReport};
pub use progress::{ProgressMode, ProgressReporter};
pub use reader::{CountingReader, Decompressor};
