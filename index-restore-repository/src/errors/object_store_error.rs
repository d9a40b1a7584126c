//! Object storage error types.

use thiserror::Error;

/// Errors that can occur while listing, fetching or checking bucket objects.
#[derive(Debug, Clone, Error)]
pub enum ObjectStoreError {
    /// The requested object does not exist.
    #[error("Object not found: {0}")]
    NotFound(String),

    /// The request could not be sent or the connection broke.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The bucket answered with an unexpected status (auth, throttling, ...).
    #[error("Request error: {0}")]
    RequestError(String),

    /// A listing response could not be parsed.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Invalid endpoint, bucket or credential configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ObjectStoreError {
    /// Create a not found error.
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound(key.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a request error.
    pub fn request(msg: impl Into<String>) -> Self {
        Self::RequestError(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Check if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
