use cafeteria_core::MailError;
use thiserror::Error;

/// Errors that can occur when using the email API client.
#[derive(Debug, Error)]
pub enum MailerError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API refused the send
    #[error("Email API error {status}: {body}")]
    Api { status: u16, body: String },

    /// Service, template or public key missing
    #[error("Email service is not configured")]
    NotConfigured,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<MailerError> for MailError {
    fn from(err: MailerError) -> Self {
        match err {
            MailerError::NotConfigured => MailError::NotConfigured,
            MailerError::Api { status, body } => MailError::Rejected(format!("{status}: {body}")),
            other => MailError::Transport(other.to_string()),
        }
    }
}
