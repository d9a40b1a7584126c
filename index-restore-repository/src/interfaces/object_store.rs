//! Object store trait definition.

use async_trait::async_trait;

use crate::errors::ObjectStoreError;
use crate::types::{ListPage, ObjectBody, ObjectHead};

/// Read-only access to the bucket holding exported archives.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List one page of objects under `prefix`, starting after `marker`.
    ///
    /// Pass the returned `next_marker` back in while `is_truncated` is set.
    async fn list(&self, prefix: &str, marker: Option<&str>)
        -> Result<ListPage, ObjectStoreError>;

    /// Fetch an object as a byte stream.
    ///
    /// Returns `ObjectStoreError::NotFound` if the key does not exist.
    async fn get(&self, key: &str) -> Result<ObjectBody, ObjectStoreError>;

    /// Check that an object exists without fetching it.
    ///
    /// Returns `ObjectStoreError::NotFound` if the key does not exist.
    async fn head(&self, key: &str) -> Result<ObjectHead, ObjectStoreError>;
}
