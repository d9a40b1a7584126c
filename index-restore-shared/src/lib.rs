//! # Index Restore Shared
//!
//! Types shared by every crate of the restore system: archive references,
//! their object-key encoding and keyword queries over archive paths.

mod archive;
mod query;

pub use archive::{archive_path, ArchiveRef, MalformedKey, DEFAULT_ARCHIVE_EXTENSION};
pub use query::KeywordQuery;
