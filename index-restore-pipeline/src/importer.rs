//! Single-pass import of one archive stream into a search index.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use index_restore_repository::SearchIndexProvider;
use tokio::io::AsyncRead;
use tracing::{info, instrument};

use crate::batch::{BatchAccumulator, IdStrategy};
use crate::commit::{CommitController, RetryPolicy, DEFAULT_BATCH_SIZE};
use crate::errors::RestoreError;
use crate::framer::LineFramer;
use crate::progress::{ProgressMode, ProgressReporter};
use crate::reader::{CountingReader, Decompressor};

/// Configuration for an import.
#[derive(Debug, Clone)]
pub struct ImportConfig {
    /// Operations per bulk request.
    pub batch_size: usize,
    /// Document id assignment.
    pub id_strategy: IdStrategy,
    /// Retry of whole batches after transport failures.
    pub retry: RetryPolicy,
    /// Progress output.
    pub progress: ProgressMode,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            id_strategy: IdStrategy::default(),
            retry: RetryPolicy::default(),
            progress: ProgressMode::default(),
        }
    }
}

impl ImportConfig {
    pub fn validate(&self) -> Result<(), RestoreError> {
        if self.batch_size == 0 {
            return Err(RestoreError::invalid_config("batch size must be at least 1"));
        }
        Ok(())
    }
}

/// Outcome of a successful import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub target_index: String,
    /// Lines framed from the decompressed stream, blank ones included.
    pub lines_read: u64,
    /// Whitespace-only lines that were skipped.
    pub blank_lines: u64,
    pub operations_submitted: usize,
    /// Bulk round-trips, never empty.
    pub bulk_requests: usize,
    /// Commits performed, including empty forced ones.
    pub commits: usize,
    /// Transport-failure retries.
    pub retries: usize,
    /// Compressed bytes consumed from the source.
    pub bytes_consumed: u64,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
}

/// Streams one archive into the search engine.
///
/// Each call to [`ArchiveImporter::import`] owns its whole reader chain, so
/// concurrent imports share nothing but the provider.
pub struct ArchiveImporter {
    provider: Arc<dyn SearchIndexProvider>,
    config: ImportConfig,
}

impl ArchiveImporter {
    pub fn new(
        provider: Arc<dyn SearchIndexProvider>,
        config: ImportConfig,
    ) -> Result<Self, RestoreError> {
        config.validate()?;
        Ok(Self { provider, config })
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// Decompress, frame and bulk-index `reader` into `target_index`.
    ///
    /// `content_length` is the declared size of the compressed stream and
    /// only drives progress. Any error aborts the import; operations flushed
    /// before the error stay committed.
    #[instrument(
        skip(self, reader),
        fields(
            batch_size = self.config.batch_size,
            id_strategy = %self.config.id_strategy
        )
    )]
    pub async fn import<R>(
        &self,
        reader: R,
        content_length: Option<u64>,
        target_index: &str,
    ) -> Result<ImportReport, RestoreError>
    where
        R: AsyncRead + Unpin,
    {
        let started_at = Utc::now();
        let clock = Instant::now();

        let decompressor = Decompressor::open(CountingReader::new(reader)).await?;
        let mut framer = LineFramer::new(decompressor);
        let mut progress =
            ProgressReporter::new(target_index, content_length, self.config.progress);
        let mut controller = CommitController::new(
            self.provider.clone(),
            BatchAccumulator::new(target_index, self.config.id_strategy),
            self.config.batch_size,
            self.config.retry,
        )?;

        info!(
            content_length = content_length.unwrap_or_default(),
            "Starting archive import"
        );

        let mut lines_read = 0u64;
        let mut blank_lines = 0u64;

        loop {
            let line = match framer.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => return Err(framer.get_ref().classify(e)),
            };
            lines_read += 1;

            if !controller.offer(line).await? {
                blank_lines += 1;
            }
            progress.update(framer.get_ref().bytes_consumed());
        }

        controller.commit(true).await?;
        progress.update(framer.get_ref().bytes_consumed());
        progress.finish();

        let stats = controller.stats();
        let report = ImportReport {
            target_index: target_index.to_string(),
            lines_read,
            blank_lines,
            operations_submitted: stats.operations_submitted,
            bulk_requests: stats.bulk_requests,
            commits: stats.commits,
            retries: stats.retries,
            bytes_consumed: framer.get_ref().bytes_consumed(),
            started_at,
            elapsed: clock.elapsed(),
        };

        info!(
            lines = report.lines_read,
            blank = report.blank_lines,
            operations = report.operations_submitted,
            bulk_requests = report.bulk_requests,
            bytes = report.bytes_consumed,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Archive import complete"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{gzip, Canned, DroppedConnection, MockProvider};

    fn importer(provider: Arc<MockProvider>, batch_size: usize) -> ArchiveImporter {
        ArchiveImporter::new(
            provider,
            ImportConfig {
                batch_size,
                progress: ProgressMode::Quiet,
                ..ImportConfig::default()
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_import_counts_lines_and_operations() {
        let provider = Arc::new(MockProvider::accepting());
        let archive = gzip(b"{\"n\":1}\n\n  \n{\"n\":2}\n{\"n\":3}").await;

        let report = importer(provider.clone(), 2)
            .import(&archive[..], Some(archive.len() as u64), "logs")
            .await
            .unwrap();

        assert_eq!(report.lines_read, 5);
        assert_eq!(report.blank_lines, 2);
        assert_eq!(report.operations_submitted, 3);
        assert_eq!(report.bulk_requests, 2);
        assert_eq!(report.bytes_consumed, archive.len() as u64);
        assert_eq!(provider.batch_sizes(), vec![2, 1]);
    }

    #[tokio::test]
    async fn test_zero_batch_size_is_rejected() {
        let result = ArchiveImporter::new(
            Arc::new(MockProvider::accepting()),
            ImportConfig {
                batch_size: 0,
                ..ImportConfig::default()
            },
        );
        assert!(matches!(result, Err(RestoreError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_corrupt_stream_sends_nothing() {
        let provider = Arc::new(MockProvider::accepting());
        let result = importer(provider.clone(), 2)
            .import(&b"not gzip at all"[..], None, "logs")
            .await;

        assert!(matches!(result, Err(RestoreError::CorruptArchive(_))));
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_transport_failure_aborts_import() {
        let provider = Arc::new(MockProvider::scripted(vec![Canned::Transport]));
        let archive = gzip(b"{}\n{}\n").await;

        let result = importer(provider.clone(), 1)
            .import(&archive[..], None, "logs")
            .await;

        assert!(matches!(result, Err(RestoreError::TransportFailure(_))));
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_source_reset_mid_archive_is_a_transport_failure() {
        let provider = Arc::new(MockProvider::accepting());
        let lines: String = (0..2000)
            .map(|i| format!("{{\"seq\":{},\"host\":\"node-{}\"}}\n", i, i * 7919 % 1000))
            .collect();
        let archive = gzip(lines.as_bytes()).await;
        let half = archive[..archive.len() / 2].to_vec();

        let result = importer(provider.clone(), 500)
            .import(DroppedConnection::after(half), Some(archive.len() as u64), "logs")
            .await;

        match result {
            Err(RestoreError::TransportFailure(msg)) => assert!(msg.contains("reset")),
            other => panic!("expected TransportFailure, got {:?}", other),
        }
        assert!(provider.batch_sizes().iter().sum::<usize>() < 2000);
    }

    #[tokio::test]
    async fn test_content_hash_ids_reach_the_provider() {
        let provider = Arc::new(MockProvider::accepting());
        let archive = gzip(b"{\"n\":1}\n").await;
        let importer = ArchiveImporter::new(
            provider.clone(),
            ImportConfig {
                id_strategy: IdStrategy::ContentHash,
                progress: ProgressMode::Quiet,
                ..ImportConfig::default()
            },
        )
        .unwrap();

        importer.import(&archive[..], None, "logs").await.unwrap();

        let batches = provider.batches();
        assert!(batches[0][0].id.is_some());
    }
}
