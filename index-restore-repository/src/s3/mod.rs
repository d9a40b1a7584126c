//! S3-compatible implementation of the object store.

mod client;

pub use client::S3ObjectStore;
