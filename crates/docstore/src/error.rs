//! Error types for docstore.

use cafeteria_core::StoreError;
use thiserror::Error;

/// Errors that can occur when talking to the document database.
#[derive(Debug, Error)]
pub enum DocStoreError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Non-success status from the database.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<DocStoreError> for StoreError {
    fn from(err: DocStoreError) -> Self {
        match err {
            DocStoreError::Status { status, body } if status == 429 || status >= 500 => {
                StoreError::Unavailable(format!("HTTP {status}: {body}"))
            }
            DocStoreError::Status { status, body } => {
                StoreError::Rejected(format!("HTTP {status}: {body}"))
            }
            DocStoreError::Json(e) => StoreError::Json(e),
            other => StoreError::Unavailable(other.to_string()),
        }
    }
}
