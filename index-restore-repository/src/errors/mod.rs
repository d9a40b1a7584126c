//! Error types for the restore repository.

mod object_store_error;
mod search_index_error;

pub use object_store_error::ObjectStoreError;
pub use search_index_error::SearchIndexError;
