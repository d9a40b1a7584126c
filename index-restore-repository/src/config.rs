//! Configuration types for the restore collaborators.

/// Default OpenSearch URL.
pub const DEFAULT_OPENSEARCH_URL: &str = "http://localhost:9200";

/// Default bucket region. S3-compatible stores usually ignore it.
pub const DEFAULT_S3_REGION: &str = "us-east-1";

/// Configuration for the OpenSearch client.
#[derive(Debug, Clone)]
pub struct OpenSearchConfig {
    /// Server URL (e.g. "http://localhost:9200").
    pub url: String,
    /// Basic auth user name.
    pub username: Option<String>,
    /// Basic auth password. Ignored without a user name.
    pub password: Option<String>,
}

impl Default for OpenSearchConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_OPENSEARCH_URL.to_string(),
            username: None,
            password: None,
        }
    }
}

impl OpenSearchConfig {
    /// Create a config for the given URL without authentication.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Use basic authentication.
    pub fn with_basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }
}

/// Configuration for an S3-compatible bucket.
#[derive(Clone)]
pub struct S3Config {
    /// Endpoint URL (e.g. "https://cos.ap-shanghai.myqcloud.com").
    pub endpoint: String,
    /// Bucket name.
    pub bucket: String,
    /// Bucket region.
    pub region: String,
    /// Access key id. Requests are unsigned when absent.
    pub access_key_id: Option<String>,
    /// Secret access key.
    pub secret_access_key: Option<String>,
}

impl std::fmt::Debug for S3Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Config")
            .field("endpoint", &self.endpoint)
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &self.secret_access_key.as_ref().map(|_| "***"))
            .finish()
    }
}

impl S3Config {
    /// Create a config for an anonymous bucket.
    pub fn new(endpoint: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            bucket: bucket.into(),
            region: DEFAULT_S3_REGION.to_string(),
            access_key_id: None,
            secret_access_key: None,
        }
    }

    /// Set the bucket region.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Sign requests with the given credentials.
    pub fn with_credentials(
        mut self,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        self.access_key_id = Some(access_key_id.into());
        self.secret_access_key = Some(secret_access_key.into());
        self
    }
}
