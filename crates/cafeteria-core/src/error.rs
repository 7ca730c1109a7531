//! Error types shared by the storage and mail collaborators.

use thiserror::Error;

/// Errors raised by a [`RemoteStore`](crate::RemoteStore) or
/// [`LocalStore`](crate::LocalStore) implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached (network, timeout, 5xx).
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The store answered but refused the request.
    #[error("store rejected request: {0}")]
    Rejected(String),

    /// A stored document did not have the expected shape.
    #[error("malformed document {collection}/{id}: {source}")]
    Malformed {
        collection: String,
        id: String,
        #[source]
        source: serde_json::Error,
    },

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Local fallback storage failed.
    #[error("local storage error: {0}")]
    Local(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors raised by a [`TemplateMailer`](crate::TemplateMailer).
#[derive(Debug, Error)]
pub enum MailError {
    /// Service, template or key is missing.
    #[error("email service is not configured")]
    NotConfigured,

    /// The email API answered with an error.
    #[error("email rejected: {0}")]
    Rejected(String),

    /// The email API could not be reached.
    #[error("email transport error: {0}")]
    Transport(String),
}
