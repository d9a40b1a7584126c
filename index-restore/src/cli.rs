//! Command-line definition.
//!
//! Every connection setting can also come from the environment (or a `.env`
//! file), so the same binary runs unchanged in containers.

use clap::{Args, Parser, Subcommand, ValueEnum};
use index_restore_pipeline::{IdStrategy, ProgressMode, DEFAULT_BATCH_SIZE};
use index_restore_repository::config::{DEFAULT_OPENSEARCH_URL, DEFAULT_S3_REGION};
use index_restore_shared::DEFAULT_ARCHIVE_EXTENSION;

#[derive(Parser, Debug)]
#[command(name = "restore")]
#[command(about = "Restore search indices from gzip NDJSON archives in object storage", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub storage: StorageArgs,

    #[command(flatten)]
    pub search: SearchArgs,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List archives whose path contains every comma-separated keyword
    Search {
        /// Comma-separated keyword fragments
        keyword: String,
    },
    /// Check that an archive exists
    Check {
        /// Index name
        index: String,
        /// Project name
        project: String,
    },
    /// Import an archive into the search engine
    Import(ImportArgs),
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Index name
    pub index: String,

    /// Project name
    pub project: String,

    /// Index to write into (defaults to the archive's index)
    #[arg(long)]
    pub target_index: Option<String>,

    /// Operations per bulk request
    #[arg(long, env = "RESTORE_BATCH_SIZE", default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Document id assignment (auto|content-hash)
    #[arg(long, default_value = "auto")]
    pub id_strategy: IdStrategy,

    /// Retries of a whole batch after a transport failure
    #[arg(long, env = "RESTORE_MAX_RETRIES", default_value_t = 0)]
    pub max_retries: u32,

    /// Progress output (log|bar|quiet)
    #[arg(long, default_value = "log")]
    pub progress: ProgressMode,
}

/// Object store connection.
#[derive(Args, Debug, Clone)]
pub struct StorageArgs {
    /// S3-compatible endpoint URL
    #[arg(long, env = "S3_ENDPOINT", global = true)]
    pub s3_endpoint: Option<String>,

    /// Bucket holding the archives
    #[arg(long, env = "S3_BUCKET", global = true)]
    pub s3_bucket: Option<String>,

    /// Bucket region
    #[arg(long, env = "S3_REGION", default_value = DEFAULT_S3_REGION, global = true)]
    pub s3_region: String,

    /// Access key id (anonymous access when unset)
    #[arg(long, env = "S3_ACCESS_KEY_ID", global = true)]
    pub s3_access_key_id: Option<String>,

    /// Secret access key
    #[arg(long, env = "S3_SECRET_ACCESS_KEY", hide_env_values = true, global = true)]
    pub s3_secret_access_key: Option<String>,

    /// Archive object key extension
    #[arg(long, env = "ARCHIVE_EXTENSION", default_value = DEFAULT_ARCHIVE_EXTENSION, global = true)]
    pub archive_extension: String,
}

/// Search engine connection.
#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// OpenSearch URL
    #[arg(long, env = "OPENSEARCH_URL", default_value = DEFAULT_OPENSEARCH_URL, global = true)]
    pub opensearch_url: String,

    /// OpenSearch basic auth user
    #[arg(long, env = "OPENSEARCH_USERNAME", global = true)]
    pub opensearch_username: Option<String>,

    /// OpenSearch basic auth password
    #[arg(long, env = "OPENSEARCH_PASSWORD", hide_env_values = true, global = true)]
    pub opensearch_password: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}
