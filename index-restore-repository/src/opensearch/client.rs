//! OpenSearch client implementation.
//!
//! This module provides the concrete implementation of `SearchIndexProvider`
//! using the OpenSearch Rust client.

use async_trait::async_trait;
use opensearch::{
    auth::Credentials,
    cluster::ClusterHealthParts,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    BulkParts, OpenSearch,
};
use serde_json::Value;
use tracing::{debug, error, info, instrument};
use url::Url;

use crate::config::OpenSearchConfig;
use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::opensearch::bulk::{encode_bulk_body, parse_bulk_response};
use crate::types::{BatchOperationSummary, IndexOperation};

/// OpenSearch client implementation.
///
/// Submits restore batches through the `_bulk` endpoint. Each operation
/// names its own target index, so one client can restore any index.
///
/// # Example
///
/// ```ignore
/// let config = OpenSearchConfig::new("http://localhost:9200");
/// let client = OpenSearchClient::new(&config)?;
///
/// let ops = vec![IndexOperation::new("logs", Bytes::from_static(b"{\"msg\":\"hi\"}"))];
/// let summary = client.bulk_index(&ops).await?;
/// assert_eq!(summary.failed, 0);
/// ```
pub struct OpenSearchClient {
    client: OpenSearch,
}

impl OpenSearchClient {
    /// Create a new OpenSearch client for the configured URL.
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchClient)` - A new client instance
    /// * `Err(SearchIndexError)` - If the URL is invalid or transport setup fails
    pub fn new(config: &OpenSearchConfig) -> Result<Self, SearchIndexError> {
        let parsed_url = Url::parse(&config.url)
            .map_err(|e| SearchIndexError::config(format!("Invalid OpenSearch URL: {}", e)))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let mut builder = TransportBuilder::new(conn_pool).disable_proxy();
        if let Some(ref username) = config.username {
            builder = builder.auth(Credentials::Basic(
                username.clone(),
                config.password.clone().unwrap_or_default(),
            ));
        }
        let transport = builder
            .build()
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(
            url = %config.url,
            authenticated = config.username.is_some(),
            "Created OpenSearch client"
        );

        Ok(Self { client })
    }
}

#[async_trait]
impl SearchIndexProvider for OpenSearchClient {
    /// Submit all operations in one `_bulk` request.
    ///
    /// A non-success HTTP status (auth failure, request too large, ...) is an
    /// error for the whole request. A success status with rejected items is
    /// reported through the returned summary.
    #[instrument(skip(self, operations), fields(count = operations.len()))]
    async fn bulk_index(
        &self,
        operations: &[IndexOperation],
    ) -> Result<BatchOperationSummary, SearchIndexError> {
        if operations.is_empty() {
            return Ok(BatchOperationSummary::empty());
        }

        let body = encode_bulk_body(operations)?;

        let response = self
            .client
            .bulk(BulkParts::None)
            .body(body)
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Bulk request failed");
            return Err(SearchIndexError::bulk_operation(format!(
                "Bulk request failed with status {}: {}",
                status, error_body
            )));
        }

        let response_body: Value = response
            .json()
            .await
            .map_err(|e| SearchIndexError::parse(e.to_string()))?;

        let summary = parse_bulk_response(&response_body, operations.len())?;

        debug!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Bulk request completed"
        );

        Ok(summary)
    }

    async fn health_check(&self) -> Result<bool, SearchIndexError> {
        let response = self
            .client
            .cluster()
            .health(ClusterHealthParts::None)
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        if !response.status_code().is_success() {
            return Ok(false);
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SearchIndexError::parse(e.to_string()))?;

        let healthy = matches!(
            body.get("status").and_then(Value::as_str),
            Some("green") | Some("yellow")
        );

        debug!(healthy = healthy, "Cluster health checked");
        Ok(healthy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_invalid_url() {
        let config = OpenSearchConfig::new("not a url");
        assert!(matches!(
            OpenSearchClient::new(&config),
            Err(SearchIndexError::ConfigError(_))
        ));
    }

    #[test]
    fn test_new_with_basic_auth() {
        let config =
            OpenSearchConfig::new("http://localhost:9200").with_basic_auth("admin", "admin");
        assert!(OpenSearchClient::new(&config).is_ok());
    }

    #[tokio::test]
    async fn test_empty_bulk_short_circuits() {
        // No server is listening; an empty batch must not hit the network
        let client = OpenSearchClient::new(&OpenSearchConfig::new("http://127.0.0.1:1")).unwrap();
        let summary = client.bulk_index(&[]).await.unwrap();
        assert_eq!(summary.total, 0);
    }
}
