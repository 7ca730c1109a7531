use cafeteria_core::StoreError;
use thiserror::Error;

/// Errors that stop a report batch before any email is sent.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("no recipients")]
    NoRecipients,

    #[error("email service is not configured")]
    MailerNotConfigured,

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
