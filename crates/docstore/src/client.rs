//! Document database HTTP client.

use async_trait::async_trait;
use cafeteria_core::{Document, RemoteStore, StoreError};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use tracing::debug;

use crate::config::DocStoreConfig;
use crate::error::DocStoreError;
use crate::types::{Created, DocumentList};

/// Client for the document database REST API.
#[derive(Clone)]
pub struct DocStoreClient {
    http: Client,
    config: DocStoreConfig,
}

impl DocStoreClient {
    /// Build a client. No request is made until the first call.
    pub fn new(config: DocStoreConfig) -> Result<Self, DocStoreError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(DocStoreError::Http)?;
        Ok(Self { http, config })
    }

    /// Get the configuration.
    pub fn config(&self) -> &DocStoreConfig {
        &self.config
    }

    /// Fetch a document, `None` on 404.
    pub async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Value>, DocStoreError> {
        let url = self.config.document_url(collection, id);
        debug!("GET {}", url);

        let response = self.authorized(self.http.get(&url)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = check(response).await?;
        Ok(Some(response.json().await?))
    }

    /// Create or replace a document.
    pub async fn put_document(&self, collection: &str, id: &str, data: &Value) -> Result<(), DocStoreError> {
        let url = self.config.document_url(collection, id);
        debug!("PUT {}", url);

        let response = self.authorized(self.http.put(&url)).json(data).send().await?;
        check(response).await?;
        Ok(())
    }

    /// Delete a document; 404 counts as success.
    pub async fn delete_document(&self, collection: &str, id: &str) -> Result<(), DocStoreError> {
        let url = self.config.document_url(collection, id);
        debug!("DELETE {}", url);

        let response = self.authorized(self.http.delete(&url)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        check(response).await?;
        Ok(())
    }

    /// List a collection, optionally the newest `limit` by a field.
    pub async fn query(
        &self,
        collection: &str,
        newest: Option<(&str, usize)>,
    ) -> Result<DocumentList, DocStoreError> {
        let url = match newest {
            Some((field, limit)) => self.config.query_url(collection, field, limit),
            None => self.config.collection_url(collection),
        };
        debug!("GET {}", url);

        let response = self.authorized(self.http.get(&url)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(DocumentList::default());
        }
        Ok(check(response).await?.json().await?)
    }

    /// Append a document and return its assigned id.
    pub async fn create_document(&self, collection: &str, data: &Value) -> Result<String, DocStoreError> {
        let url = self.config.collection_url(collection);
        debug!("POST {}", url);

        let response = self.authorized(self.http.post(&url)).json(data).send().await?;
        let created: Created = check(response).await?.json().await?;
        Ok(created.id)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.config.api_key() {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }
}

async fn check(response: Response) -> Result<Response, DocStoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(DocStoreError::Status {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl RemoteStore for DocStoreClient {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.get_document(collection, id).await?)
    }

    async fn set(&self, collection: &str, id: &str, data: &Value) -> Result<(), StoreError> {
        Ok(self.put_document(collection, id, data).await?)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        Ok(self.delete_document(collection, id).await?)
    }

    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let list = self.query(collection, None).await?;
        Ok(list
            .documents
            .into_iter()
            .map(|d| Document { id: d.id, data: d.data })
            .collect())
    }

    async fn latest(&self, collection: &str, order_by: &str, limit: usize) -> Result<Vec<Document>, StoreError> {
        let list = self
            .query(collection, Some((order_by, limit)))
            .await?;
        Ok(list
            .documents
            .into_iter()
            .map(|d| Document { id: d.id, data: d.data })
            .collect())
    }

    async fn add(&self, collection: &str, data: &Value) -> Result<String, StoreError> {
        Ok(self.create_document(collection, data).await?)
    }

    fn name(&self) -> &str {
        "docstore"
    }
}

impl std::fmt::Debug for DocStoreClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocStoreClient")
            .field("base_url", &self.config.base_url)
            .field("api_key", &self.config.has_api_key())
            .finish()
    }
}
