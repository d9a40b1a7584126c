//! Archive enumeration and lookup in the object store.

use std::sync::Arc;

use index_restore_repository::ObjectStore;
use index_restore_shared::{archive_path, ArchiveRef, KeywordQuery};
use tracing::{info, instrument, warn};

use crate::errors::RestoreError;
use crate::importer::{ArchiveImporter, ImportReport};

/// An archive found by [`ArchiveCatalog::search`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveMatch {
    pub archive: ArchiveRef,
    pub key: String,
    /// Compressed size in bytes.
    pub size: u64,
}

impl ArchiveMatch {
    /// Size in megabytes (10^6 bytes).
    pub fn size_mb(&self) -> f64 {
        self.size as f64 / 1_000_000.0
    }
}

/// Archives stored under `<index>/<project><extension>` in one bucket.
pub struct ArchiveCatalog {
    store: Arc<dyn ObjectStore>,
    extension: String,
}

impl ArchiveCatalog {
    /// Fails with `InvalidConfig` if `extension` is empty.
    pub fn new(
        store: Arc<dyn ObjectStore>,
        extension: impl Into<String>,
    ) -> Result<Self, RestoreError> {
        let extension = extension.into();
        if extension.is_empty() {
            return Err(RestoreError::invalid_config(
                "archive extension must not be empty",
            ));
        }
        Ok(Self { store, extension })
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Object key of an archive.
    pub fn key_for(&self, archive: &ArchiveRef) -> String {
        archive.object_key(&self.extension)
    }

    /// List every archive whose path contains all keyword fragments.
    ///
    /// Keys without the archive extension, and matching keys that are not
    /// `<index>/<project>`, are logged and skipped.
    #[instrument(skip(self))]
    pub async fn search(&self, keyword: &str) -> Result<Vec<ArchiveMatch>, RestoreError> {
        let query = KeywordQuery::parse(keyword);
        info!(fragments = ?query.fragments(), "Searching object store for archives");

        let mut matches = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let page = self.store.list("", marker.as_deref()).await?;

            for entry in &page.entries {
                let Some(path) = archive_path(&entry.key, &self.extension) else {
                    warn!(key = %entry.key, "Found unknown file");
                    continue;
                };
                if !query.matches(path) {
                    continue;
                }

                let archive = match ArchiveRef::from_object_key(&entry.key, &self.extension) {
                    Ok(archive) => archive,
                    Err(e) => {
                        warn!(error = %RestoreError::from(e), "Skipping archive");
                        continue;
                    }
                };

                let found = ArchiveMatch {
                    archive,
                    key: entry.key.clone(),
                    size: entry.size,
                };
                info!(
                    index = found.archive.index(),
                    project = found.archive.project(),
                    size_mb = found.size_mb(),
                    "Found archive"
                );
                matches.push(found);
            }

            if !page.is_truncated {
                break;
            }
            // Stores that omit the marker continue after the last key
            marker = match page.next_marker.or_else(|| page.entries.last().map(|e| e.key.clone())) {
                Some(next) => Some(next),
                None => break,
            };
        }

        info!(count = matches.len(), "Archive search complete");
        Ok(matches)
    }

    /// Confirm an archive exists, returning its size when the store reports one.
    #[instrument(skip(self, archive), fields(archive = %archive))]
    pub async fn check(&self, archive: &ArchiveRef) -> Result<Option<u64>, RestoreError> {
        let key = self.key_for(archive);
        let head = self.store.head(&key).await?;

        info!(
            key = %key,
            size = head.size.unwrap_or_default(),
            "Archive exists"
        );
        Ok(head.size)
    }

    /// Fetch an archive and import it into `target_index`, or into the
    /// archive's own index when no target is given.
    ///
    /// The object body is dropped on every exit path.
    #[instrument(skip(self, importer, archive), fields(archive = %archive))]
    pub async fn restore(
        &self,
        importer: &ArchiveImporter,
        archive: &ArchiveRef,
        target_index: Option<&str>,
    ) -> Result<ImportReport, RestoreError> {
        let key = self.key_for(archive);
        let target = target_index.unwrap_or(archive.index());
        info!(key = %key, target_index = %target, "Restoring index from archive");

        let body = self.store.get(&key).await?;
        importer
            .import(body.reader, body.content_length, target)
            .await
    }
}
