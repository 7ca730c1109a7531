//! Traits for the external collaborators.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{MailError, Result};

/// A raw document as returned by a [`RemoteStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

/// The remote document database.
///
/// Documents live in named collections and are addressed by string id.
/// Implementations are object-safe and shared as `Arc<dyn RemoteStore>`.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetch a document. `Ok(None)` when it does not exist.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>>;

    /// Create or overwrite a document wholesale.
    async fn set(&self, collection: &str, id: &str, data: &Value) -> Result<()>;

    /// Delete a document. Deleting a missing document is not an error.
    async fn delete(&self, collection: &str, id: &str) -> Result<()>;

    /// Every document of a collection.
    async fn list(&self, collection: &str) -> Result<Vec<Document>>;

    /// The `limit` documents with the greatest `order_by` field, descending.
    async fn latest(&self, collection: &str, order_by: &str, limit: usize) -> Result<Vec<Document>>;

    /// Append a document with a store-assigned id; returns the id.
    async fn add(&self, collection: &str, data: &Value) -> Result<String>;

    /// Human-readable backend name for logs.
    fn name(&self) -> &str;
}

/// Local string key/value storage used when the remote store is unavailable.
#[async_trait]
pub trait LocalStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;

    async fn remove(&self, key: &str) -> Result<()>;

    /// Keys starting with `prefix`, sorted.
    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>>;
}

/// A transactional email API that renders a server-side template.
#[async_trait]
pub trait TemplateMailer: Send + Sync {
    /// Send the template to `to` with the given template variables.
    async fn send_template(&self, to: &str, params: &Value) -> std::result::Result<(), MailError>;

    /// Whether credentials and template ids are set.
    ///
    /// Default implementation always returns true.
    fn is_configured(&self) -> bool {
        true
    }
}
