//! Configuration types for docstore.

use std::env;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::error::DocStoreError;

/// Configuration for connecting to the document database.
#[derive(Debug, Clone)]
pub struct DocStoreConfig {
    /// Base URL of the REST API (e.g., "https://db.example.com").
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Bearer API key, if the database requires one.
    api_key: Option<SecretString>,
}

impl DocStoreConfig {
    /// Create a new configuration with the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(15),
            api_key: None,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Required:
    /// - `DOCSTORE_URL` - Base URL of the REST API
    ///
    /// Optional:
    /// - `DOCSTORE_API_KEY` - Bearer API key
    /// - `DOCSTORE_TIMEOUT_SECS` - Default: 15
    pub fn from_env() -> Result<Self, DocStoreError> {
        let base_url = env::var("DOCSTORE_URL")
            .map_err(|_| DocStoreError::MissingEnvVar("DOCSTORE_URL".to_string()))?;
        if base_url.trim().is_empty() {
            return Err(DocStoreError::Config("DOCSTORE_URL is empty".to_string()));
        }

        let timeout = env::var("DOCSTORE_TIMEOUT_SECS")
            .unwrap_or_else(|_| "15".to_string())
            .parse::<u64>()
            .map_err(|e| DocStoreError::Config(format!("Invalid DOCSTORE_TIMEOUT_SECS: {}", e)))?;

        let mut config = Self::new(base_url).with_timeout(Duration::from_secs(timeout));
        if let Ok(key) = env::var("DOCSTORE_API_KEY") {
            if !key.trim().is_empty() {
                config = config.with_api_key(key);
            }
        }
        Ok(config)
    }

    /// Builder method to set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::from(key.into()));
        self
    }

    /// Builder method to set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Get the API key (exposes the secret).
    pub(crate) fn api_key(&self) -> Option<&str> {
        self.api_key.as_ref().map(|k| k.expose_secret())
    }

    /// URL of a collection.
    pub fn collection_url(&self, collection: &str) -> String {
        format!(
            "{}/v1/collections/{}/documents",
            self.base_url,
            urlencoding::encode(collection)
        )
    }

    /// URL of a single document.
    pub fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{}", self.collection_url(collection), urlencoding::encode(id))
    }

    /// URL of a query for the `limit` documents with the greatest `order_by`.
    pub fn query_url(&self, collection: &str, order_by: &str, limit: usize) -> String {
        format!(
            "{}?orderBy={}&direction=desc&limit={}",
            self.collection_url(collection),
            urlencoding::encode(order_by),
            limit
        )
    }
}
