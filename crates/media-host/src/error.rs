//! Error types for media-host.

use thiserror::Error;

/// A file refused before upload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error("file is empty")]
    Empty,

    #[error("file too large: {size} bytes (max {max})")]
    TooLarge { size: usize, max: usize },

    #[error("unsupported file type: {0}")]
    UnsupportedType(String),
}

/// Errors that can occur when talking to the file host.
#[derive(Debug, Error)]
pub enum HostError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error (e.g., reading a local file).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file host refused the upload.
    #[error("file host error {status}: {message}")]
    Api { status: u16, message: String },

    /// The file failed validation.
    #[error(transparent)]
    Invalid(#[from] UploadError),

    /// Cloud name or upload preset missing.
    #[error("file host is not configured")]
    NotConfigured,

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}
