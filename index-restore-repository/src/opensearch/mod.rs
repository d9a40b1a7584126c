//! OpenSearch implementation of the search index provider.
//!
//! This module provides a concrete implementation of `SearchIndexProvider`
//! using OpenSearch's bulk API as the backend.

mod bulk;
mod client;

pub use bulk::{encode_bulk_body, parse_bulk_response};
pub use client::OpenSearchClient;
