//! Search index error types.
//!
//! This module defines the error types that can occur while talking to the
//! search engine's bulk API.

use thiserror::Error;

/// Errors that can occur during search index operations.
#[derive(Debug, Clone, Error)]
pub enum SearchIndexError {
    /// Failed to establish connection to the search engine, or the request
    /// never produced a response.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The engine answered the bulk request with a non-success status.
    #[error("Bulk operation error: {0}")]
    BulkOperationError(String),

    /// The engine's response could not be interpreted.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Invalid client configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl SearchIndexError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a bulk operation error.
    pub fn bulk_operation(msg: impl Into<String>) -> Self {
        Self::BulkOperationError(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
