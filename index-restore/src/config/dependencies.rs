//! Dependency initialization and wiring for the restore binary.

use std::sync::Arc;
use tracing::info;

use crate::cli::{SearchArgs, StorageArgs};
use crate::CliError;
use index_restore_pipeline::ArchiveCatalog;
use index_restore_repository::{
    ObjectStore, OpenSearchClient, OpenSearchConfig, S3Config, S3ObjectStore, SearchIndexProvider,
};

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// Archives in the configured bucket.
    pub catalog: ArchiveCatalog,
    /// Bulk-write target. Only built for commands that write.
    pub search_index: Option<Arc<dyn SearchIndexProvider>>,
}

impl Dependencies {
    /// Wire already-constructed collaborators.
    pub fn new(
        store: Arc<dyn ObjectStore>,
        archive_extension: &str,
        search_index: Option<Arc<dyn SearchIndexProvider>>,
    ) -> Result<Self, CliError> {
        let catalog = ArchiveCatalog::new(store, archive_extension)?;
        Ok(Self {
            catalog,
            search_index,
        })
    }

    /// Initialize the object store, and the search engine client when
    /// `with_search_index` is set, from command-line and environment settings.
    ///
    /// # Environment Variables
    ///
    /// - `S3_ENDPOINT`, `S3_BUCKET`: required
    /// - `S3_REGION`: bucket region (default: us-east-1)
    /// - `S3_ACCESS_KEY_ID`, `S3_SECRET_ACCESS_KEY`: optional, set together
    /// - `ARCHIVE_EXTENSION`: object key extension (default: .ndjson.gz)
    /// - `OPENSEARCH_URL`: OpenSearch server URL (default: http://localhost:9200)
    /// - `OPENSEARCH_USERNAME`, `OPENSEARCH_PASSWORD`: optional basic auth
    pub fn from_args(
        storage: &StorageArgs,
        search: &SearchArgs,
        with_search_index: bool,
    ) -> Result<Self, CliError> {
        let store = Self::object_store(storage)?;
        info!(
            bucket = storage.s3_bucket.as_deref().unwrap_or_default(),
            archive_extension = %storage.archive_extension,
            "Object store initialized"
        );

        let search_index = if with_search_index {
            Some(Self::search_index(search)?)
        } else {
            None
        };

        Self::new(store, &storage.archive_extension, search_index)
    }

    fn object_store(storage: &StorageArgs) -> Result<Arc<dyn ObjectStore>, CliError> {
        let endpoint = storage
            .s3_endpoint
            .as_deref()
            .ok_or_else(|| CliError::config("S3_ENDPOINT is not set"))?;
        let bucket = storage
            .s3_bucket
            .as_deref()
            .ok_or_else(|| CliError::config("S3_BUCKET is not set"))?;

        let mut config = S3Config::new(endpoint, bucket).with_region(storage.s3_region.as_str());
        match (&storage.s3_access_key_id, &storage.s3_secret_access_key) {
            (Some(key), Some(secret)) => {
                config = config.with_credentials(key.as_str(), secret.as_str());
            }
            (None, None) => {}
            _ => {
                return Err(CliError::config(
                    "S3_ACCESS_KEY_ID and S3_SECRET_ACCESS_KEY must be set together",
                ))
            }
        }

        Ok(Arc::new(S3ObjectStore::new(&config)?))
    }

    fn search_index(search: &SearchArgs) -> Result<Arc<dyn SearchIndexProvider>, CliError> {
        let mut config = OpenSearchConfig::new(search.opensearch_url.as_str());
        match (&search.opensearch_username, &search.opensearch_password) {
            (Some(user), Some(password)) => {
                config = config.with_basic_auth(user.as_str(), password.as_str());
            }
            (None, None) => {}
            _ => {
                return Err(CliError::config(
                    "OPENSEARCH_USERNAME and OPENSEARCH_PASSWORD must be set together",
                ))
            }
        }

        let client = OpenSearchClient::new(&config)?;
        info!(opensearch_url = %search.opensearch_url, "OpenSearch client initialized");

        Ok(Arc::new(client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use index_restore_repository::config::{DEFAULT_OPENSEARCH_URL, DEFAULT_S3_REGION};

    fn storage() -> StorageArgs {
        StorageArgs {
            s3_endpoint: Some("http://localhost:9000".to_string()),
            s3_bucket: Some("exports".to_string()),
            s3_region: DEFAULT_S3_REGION.to_string(),
            s3_access_key_id: None,
            s3_secret_access_key: None,
            archive_extension: ".ndjson.gz".to_string(),
        }
    }

    fn search() -> SearchArgs {
        SearchArgs {
            opensearch_url: DEFAULT_OPENSEARCH_URL.to_string(),
            opensearch_username: None,
            opensearch_password: None,
        }
    }

    #[test]
    fn test_missing_bucket_is_a_config_error() {
        let mut args = storage();
        args.s3_bucket = None;
        let result = Dependencies::from_args(&args, &search(), false);
        assert!(matches!(result, Err(CliError::ConfigError(_))));
    }

    #[test]
    fn test_half_set_credentials_rejected() {
        let mut args = storage();
        args.s3_access_key_id = Some("key".to_string());
        let result = Dependencies::from_args(&args, &search(), false);
        assert!(matches!(result, Err(CliError::ConfigError(_))));
    }

    #[test]
    fn test_search_index_only_built_on_request() {
        let deps = Dependencies::from_args(&storage(), &search(), false).unwrap();
        assert!(deps.search_index.is_none());

        let deps = Dependencies::from_args(&storage(), &search(), true).unwrap();
        assert!(deps.search_index.is_some());
        assert_eq!(deps.catalog.extension(), ".ndjson.gz");
    }
}
