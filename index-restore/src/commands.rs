//! Subcommand handlers.

use tracing::{info, instrument, warn};

use crate::cli::{Command, ImportArgs};
use crate::config::Dependencies;
use crate::CliError;
use index_restore_pipeline::{ArchiveImporter, ImportConfig, ImportReport, RetryPolicy};
use index_restore_shared::ArchiveRef;

/// Whether a command writes to the search engine.
pub fn needs_search_index(command: &Command) -> bool {
    matches!(command, Command::Import(_))
}

/// Run one subcommand against the wired dependencies.
pub async fn execute(command: &Command, deps: &Dependencies) -> Result<(), CliError> {
    match command {
        Command::Search { keyword } => {
            let matches = deps.catalog.search(keyword).await?;
            info!(count = matches.len(), keyword = %keyword, "Search finished");
            Ok(())
        }
        Command::Check { index, project } => {
            let archive = ArchiveRef::new(index.as_str(), project.as_str());
            deps.catalog.check(&archive).await?;
            Ok(())
        }
        Command::Import(args) => import(args, deps).await.map(|_| ()),
    }
}

#[instrument(skip(args, deps), fields(index = %args.index, project = %args.project))]
async fn import(args: &ImportArgs, deps: &Dependencies) -> Result<ImportReport, CliError> {
    let search_index = deps
        .search_index
        .clone()
        .ok_or_else(|| CliError::config("search engine client is not configured"))?;

    // Logged only; bulk writes report their own failures
    match search_index.health_check().await {
        Ok(true) => info!("OpenSearch connection verified"),
        Ok(false) => warn!("OpenSearch cluster health unavailable or red; continuing"),
        Err(e) => warn!(error = %e, "OpenSearch health check failed; continuing"),
    }

    let config = ImportConfig {
        batch_size: args.batch_size,
        id_strategy: args.id_strategy,
        retry: RetryPolicy::with_max_retries(args.max_retries),
        progress: args.progress,
    };
    let importer = ArchiveImporter::new(search_index, config)?;

    let archive = ArchiveRef::new(args.index.as_str(), args.project.as_str());
    let report = deps
        .catalog
        .restore(&importer, &archive, args.target_index.as_deref())
        .await?;

    info!(
        target_index = %report.target_index,
        operations = report.operations_submitted,
        bulk_requests = report.bulk_requests,
        started_at = %report.started_at.to_rfc3339(),
        elapsed_secs = report.elapsed.as_secs_f64(),
        "Restore complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_compression::tokio::bufread::GzipEncoder;
    use async_trait::async_trait;
    use index_restore_pipeline::{ProgressMode, RestoreError};
    use index_restore_repository::{
        BatchOperationResult, BatchOperationSummary, IndexOperation, ListPage, ObjectBody,
        ObjectEntry, ObjectHead, ObjectStore, ObjectStoreError, SearchIndexError,
        SearchIndexProvider,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::AsyncReadExt;

    /// Store holding a single archive.
    struct SingleArchive {
        key: String,
        data: Vec<u8>,
    }

    #[async_trait]
    impl ObjectStore for SingleArchive {
        async fn list(&self, _prefix: &str, _marker: Option<&str>) -> Result<ListPage, ObjectStoreError> {
            Ok(ListPage {
                entries: vec![ObjectEntry {
                    key: self.key.clone(),
                    size: self.data.len() as u64,
                }],
                next_marker: None,
                is_truncated: false,
            })
        }

        async fn get(&self, key: &str) -> Result<ObjectBody, ObjectStoreError> {
            if key != self.key {
                return Err(ObjectStoreError::not_found(key));
            }
            Ok(ObjectBody {
                reader: Box::new(std::io::Cursor::new(self.data.clone())),
                content_length: Some(self.data.len() as u64),
            })
        }

        async fn head(&self, key: &str) -> Result<ObjectHead, ObjectStoreError> {
            if key != self.key {
                return Err(ObjectStoreError::not_found(key));
            }
            Ok(ObjectHead {
                size: Some(self.data.len() as u64),
            })
        }
    }

    /// Search engine that accepts everything and counts documents.
    struct CountingEngine {
        healthy: bool,
        documents: AtomicUsize,
    }

    #[async_trait]
    impl SearchIndexProvider for CountingEngine {
        async fn bulk_index(
            &self,
            operations: &[IndexOperation],
        ) -> Result<BatchOperationSummary, SearchIndexError> {
            self.documents.fetch_add(operations.len(), Ordering::SeqCst);
            Ok(BatchOperationSummary::from_results(
                (0..operations.len()).map(BatchOperationResult::succeeded).collect(),
            ))
        }

        async fn health_check(&self) -> Result<bool, SearchIndexError> {
            Ok(self.healthy)
        }
    }

    async fn deps(healthy: bool) -> (Dependencies, Arc<CountingEngine>) {
        let mut encoder = GzipEncoder::new(&b"{\"a\":1}\n{\"a\":2}\n{\"a\":3}\n"[..]);
        let mut data = Vec::new();
        encoder.read_to_end(&mut data).await.unwrap();

        let store = Arc::new(SingleArchive {
            key: "logs/billing.ndjson.gz".to_string(),
            data,
        });
        let engine = Arc::new(CountingEngine {
            healthy,
            documents: AtomicUsize::new(0),
        });
        let search_index: Arc<dyn SearchIndexProvider> = engine.clone();
        let deps = Dependencies::new(store, ".ndjson.gz", Some(search_index)).unwrap();
        (deps, engine)
    }

    fn import_args(project: &str) -> ImportArgs {
        ImportArgs {
            index: "logs".to_string(),
            project: project.to_string(),
            target_index: None,
            batch_size: 2,
            id_strategy: Default::default(),
            max_retries: 0,
            progress: ProgressMode::Quiet,
        }
    }

    #[tokio::test]
    async fn test_import_writes_every_document() {
        let (deps, engine) = deps(true).await;

        let report = import(&import_args("billing"), &deps).await.unwrap();

        assert_eq!(report.operations_submitted, 3);
        assert_eq!(report.target_index, "logs");
        assert_eq!(engine.documents.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_import_proceeds_when_health_check_fails() {
        let (deps, engine) = deps(false).await;

        let report = import(&import_args("billing"), &deps).await.unwrap();

        assert_eq!(report.operations_submitted, 3);
        assert_eq!(engine.documents.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_check_missing_archive_fails() {
        let (deps, _) = deps(true).await;
        let command = Command::Check {
            index: "logs".to_string(),
            project: "payroll".to_string(),
        };

        let result = execute(&command, &deps).await;
        assert!(matches!(
            result,
            Err(CliError::RestoreError(RestoreError::ArchiveNotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_search_succeeds() {
        let (deps, _) = deps(true).await;
        let command = Command::Search {
            keyword: "logs".to_string(),
        };
        assert!(execute(&command, &deps).await.is_ok());
        assert!(!needs_search_index(&command));
    }
}
