//! S3-compatible object store.
//!
//! Requests are presigned with `rusty-s3` and executed with `reqwest`, so any
//! S3-compatible bucket (AWS, MinIO, Tencent COS, ...) works. Object bodies
//! are streamed, never buffered whole.

use std::io;
use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use reqwest::{header::CONTENT_LENGTH, Response, StatusCode};
use rusty_s3::actions::{ListObjectsV2, S3Action};
use rusty_s3::{Bucket, Credentials, UrlStyle};
use tokio_util::io::StreamReader;
use tracing::{debug, info, instrument};
use url::Url;

use crate::config::S3Config;
use crate::errors::ObjectStoreError;
use crate::interfaces::ObjectStore;
use crate::types::{ListPage, ObjectBody, ObjectEntry, ObjectHead};

/// Duration for presigned URL validity.
const PRESIGN_DURATION: Duration = Duration::from_secs(3600);

/// Timeout for establishing a connection to the bucket.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Object store backed by an S3-compatible bucket.
pub struct S3ObjectStore {
    bucket: Bucket,
    credentials: Option<Credentials>,
    http: reqwest::Client,
}

impl S3ObjectStore {
    /// Create a new store for the configured bucket.
    ///
    /// Uses path-style addressing since the endpoint is always explicit.
    pub fn new(config: &S3Config) -> Result<Self, ObjectStoreError> {
        let endpoint: Url = config.endpoint.parse().map_err(|e| {
            ObjectStoreError::config(format!("Invalid S3 endpoint URL '{}': {}", config.endpoint, e))
        })?;

        let bucket = Bucket::new(
            endpoint,
            UrlStyle::Path,
            config.bucket.clone(),
            config.region.clone(),
        )
        .map_err(|e| ObjectStoreError::config(format!("Failed to create bucket handle: {}", e)))?;

        let credentials = match (&config.access_key_id, &config.secret_access_key) {
            (Some(key), Some(secret)) => Some(Credentials::new(key.clone(), secret.clone())),
            (None, None) => None,
            _ => {
                return Err(ObjectStoreError::config(
                    "Access key id and secret access key must be set together",
                ))
            }
        };

        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| ObjectStoreError::config(format!("Failed to build HTTP client: {}", e)))?;

        info!(
            endpoint = %config.endpoint,
            bucket = %config.bucket,
            signed = credentials.is_some(),
            "Created S3 object store"
        );

        Ok(Self {
            bucket,
            credentials,
            http,
        })
    }

    /// Map a non-success status to an error. 404 becomes `NotFound`.
    async fn check_status(op: &str, key: &str, response: Response) -> Result<Response, ObjectStoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(ObjectStoreError::not_found(key));
        }

        let body = response.text().await.unwrap_or_default();
        Err(ObjectStoreError::request(format!(
            "S3 {} {} failed with status {}: {}",
            op, key, status, body
        )))
    }
}

/// Read the `Content-Length` header.
fn content_length(response: &Response) -> Option<u64> {
    response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

/// Decode a `ListObjectsV2` response body.
fn parse_list_page(prefix: &str, body: &[u8]) -> Result<ListPage, ObjectStoreError> {
    let xml = std::str::from_utf8(body)
        .map_err(|e| ObjectStoreError::parse(format!("S3 LIST {}: {}", prefix, e)))?;
    let parsed = ListObjectsV2::parse_response(xml)
        .map_err(|e| ObjectStoreError::parse(format!("S3 LIST {}: {}", prefix, e)))?;

    let entries = parsed
        .contents
        .into_iter()
        // Skip directory markers
        .filter(|obj| !obj.key.ends_with('/'))
        .map(|obj| ObjectEntry {
            key: obj.key,
            size: obj.size,
        })
        .collect();

    Ok(ListPage {
        entries,
        is_truncated: parsed.next_continuation_token.is_some(),
        next_marker: parsed.next_continuation_token,
    })
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    #[instrument(skip(self))]
    async fn list(&self, prefix: &str, marker: Option<&str>) -> Result<ListPage, ObjectStoreError> {
        let mut action = self.bucket.list_objects_v2(self.credentials.as_ref());
        if !prefix.is_empty() {
            action.query_mut().insert("prefix", prefix);
        }
        if let Some(token) = marker {
            action.query_mut().insert("continuation-token", token);
        }
        let url = action.sign(PRESIGN_DURATION);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ObjectStoreError::connection(format!("S3 LIST {}: {}", prefix, e)))?;
        let response = Self::check_status("LIST", prefix, response).await?;

        let body = response
            .bytes()
            .await
            .map_err(|e| ObjectStoreError::connection(format!("S3 LIST {}: {}", prefix, e)))?;
        let page = parse_list_page(prefix, &body)?;
        debug!(count = page.entries.len(), "Listed objects");

        Ok(page)
    }

    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> Result<ObjectBody, ObjectStoreError> {
        let url = self
            .bucket
            .get_object(self.credentials.as_ref(), key)
            .sign(PRESIGN_DURATION);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ObjectStoreError::connection(format!("S3 GET {}: {}", key, e)))?;
        let response = Self::check_status("GET", key, response).await?;

        let content_length = content_length(&response);
        let stream = response.bytes_stream().map_err(io::Error::other);
        let reader = StreamReader::new(Box::pin(stream));

        debug!(content_length = ?content_length, "Opened object stream");

        Ok(ObjectBody {
            reader: Box::new(reader),
            content_length,
        })
    }

    #[instrument(skip(self))]
    async fn head(&self, key: &str) -> Result<ObjectHead, ObjectStoreError> {
        let url = self
            .bucket
            .head_object(self.credentials.as_ref(), key)
            .sign(PRESIGN_DURATION);

        let response = self
            .http
            .head(url)
            .send()
            .await
            .map_err(|e| ObjectStoreError::connection(format!("S3 HEAD {}: {}", key, e)))?;
        let response = Self::check_status("HEAD", key, response).await?;

        Ok(ObjectHead {
            size: content_length(&response),
        })
    }
}
