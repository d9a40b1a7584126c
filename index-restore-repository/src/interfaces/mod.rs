//! Interface definitions for the restore collaborators.
//!
//! These traits allow dependency injection of the object store and the
//! search engine, so the restore pipeline can run against fakes in tests.

mod object_store;
mod search_index_provider;

pub use object_store::ObjectStore;
pub use search_index_provider::SearchIndexProvider;
