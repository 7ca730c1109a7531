//! Error types for the HTTP API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use cafeteria_core::recipients::RecipientError;
use cafeteria_core::schedule::ScheduleError;
use cafeteria_core::stats::ExportError;
use cafeteria_core::vote::VoteError;
use cafeteria_core::StoreError;
use media_host::{HostError, UploadError};
use reporter::ReportError;
use thiserror::Error;

/// Errors returned by handlers.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Missing or wrong admin password.
    #[error("Unauthorized")]
    Unauthorized,

    /// Malformed request.
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Vote(#[from] VoteError),

    #[error(transparent)]
    Recipients(#[from] RecipientError),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error(transparent)]
    Host(#[from] HostError),

    #[error(transparent)]
    Report(#[from] ReportError),

    /// Both storage tiers failed.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AdminError {
    fn status(&self) -> StatusCode {
        match self {
            AdminError::Unauthorized => StatusCode::UNAUTHORIZED,
            AdminError::BadRequest(_) | AdminError::Schedule(_) => StatusCode::BAD_REQUEST,
            AdminError::Vote(VoteError::DuplicateName(_)) => StatusCode::CONFLICT,
            AdminError::Vote(_) => StatusCode::BAD_REQUEST,
            AdminError::Recipients(RecipientError::Duplicates(_)) => StatusCode::CONFLICT,
            AdminError::Recipients(_) => StatusCode::BAD_REQUEST,
            AdminError::Host(HostError::Invalid(_)) => StatusCode::BAD_REQUEST,
            AdminError::Host(HostError::NotConfigured) => StatusCode::INTERNAL_SERVER_ERROR,
            AdminError::Host(_) => StatusCode::BAD_GATEWAY,
            AdminError::Report(ReportError::NoRecipients | ReportError::MailerNotConfigured) => {
                StatusCode::BAD_REQUEST
            }
            AdminError::Report(ReportError::Store(_)) | AdminError::Store(_) => StatusCode::BAD_GATEWAY,
            AdminError::Report(ReportError::Json(_))
            | AdminError::Export(_)
            | AdminError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<UploadError> for AdminError {
    fn from(err: UploadError) -> Self {
        AdminError::Host(HostError::Invalid(err))
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "{}", message);
        } else {
            tracing::warn!(status = status.as_u16(), "{}", message);
        }

        let body = serde_json::json!({
            "error": message
        });

        (status, Json(body)).into_response()
    }
}

/// Result type for handlers.
pub type Result<T> = std::result::Result<T, AdminError>;
