//! Search index provider trait definition.
//!
//! This module defines the abstract interface for bulk-writing into a search
//! engine, allowing for different backend implementations (OpenSearch,
//! Elasticsearch, in-memory fakes).

use async_trait::async_trait;

use crate::errors::SearchIndexError;
use crate::types::{BatchOperationSummary, IndexOperation};

/// Abstracts the underlying search index implementation.
///
/// Implementations are injected into the restore pipeline so that commit
/// behavior can be tested with mock providers returning canned results.
#[async_trait]
pub trait SearchIndexProvider: Send + Sync {
    /// Submit a batch of indexing operations in a single bulk request.
    ///
    /// # Arguments
    ///
    /// * `operations` - The operations to submit, in order
    ///
    /// # Returns
    ///
    /// * `Ok(BatchOperationSummary)` - Per-item results. Rejected items are
    ///   reported here, not as an `Err`.
    /// * `Err(SearchIndexError)` - If the request itself failed (network,
    ///   authentication, non-success HTTP status)
    async fn bulk_index(
        &self,
        operations: &[IndexOperation],
    ) -> Result<BatchOperationSummary, SearchIndexError>;

    /// Check if the search engine is healthy and reachable.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If the search engine is healthy
    /// * `Ok(false)` - If the search engine is unhealthy
    /// * `Err(SearchIndexError)` - If the health check fails to execute
    async fn health_check(&self) -> Result<bool, SearchIndexError>;
}
