//! # Index Restore Repository
//!
//! This crate provides traits and implementations for the two collaborators
//! of a restore: the object store holding exported archives and the search
//! engine receiving bulk writes. It includes definitions for errors,
//! interfaces, and concrete implementations for S3-compatible buckets and
//! OpenSearch.

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod opensearch;
pub mod s3;
pub mod types;

pub use config::{OpenSearchConfig, S3Config};
pub use errors::{ObjectStoreError, SearchIndexError};
pub use interfaces::{ObjectStore, SearchIndexProvider};
pub use opensearch::OpenSearchClient;
pub use s3::S3ObjectStore;
pub use types::{
    BatchOperationResult, BatchOperationSummary, BulkItemFailure, IndexOperation, ListPage,
    ObjectBody, ObjectEntry, ObjectHead,
};
