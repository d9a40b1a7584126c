//! # Index Restore
//!
//! Command-line entry point for restoring search indices from archives held
//! in object storage.
//!
//! This crate provides the CLI definition, the dependency wiring and the
//! subcommand handlers; the import itself lives in `index-restore-pipeline`.

pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;

pub use cli::{Cli, Command};
pub use config::Dependencies;

use index_restore_pipeline::RestoreError;
use index_restore_repository::{ObjectStoreError, SearchIndexError};
use thiserror::Error;

/// Errors that can occur while running a restore command.
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Restore error.
    #[error(transparent)]
    RestoreError(#[from] RestoreError),

    /// Search engine client error.
    #[error("Search error: {0}")]
    SearchError(#[from] SearchIndexError),

    /// Object store client error.
    #[error("Object store error: {0}")]
    ObjectStoreError(#[from] ObjectStoreError),
}

impl CliError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Structured detail of a rejected bulk item, if that is what failed.
    pub fn failure_detail(&self) -> Option<String> {
        match self {
            Self::RestoreError(e) => e.failure_detail(),
            _ => None,
        }
    }
}
