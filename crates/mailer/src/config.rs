use std::env;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::MailerError;

/// Prefix of the placeholder values shipped in sample configuration.
const PLACEHOLDER_PREFIX: &str = "VOTRE_";

/// Configuration for the template email API.
#[derive(Debug, Clone)]
pub struct MailerConfig {
    /// API base URL (default: https://api.emailjs.com)
    pub api_url: String,
    /// Email service id
    pub service_id: String,
    /// Template id
    pub template_id: String,
    /// Account public key
    pub public_key: String,
    /// Request timeout (default: 20s)
    pub timeout: Duration,
    /// Account private key
    private_key: Option<SecretString>,
}

impl MailerConfig {
    pub const DEFAULT_API_URL: &'static str = "https://api.emailjs.com";

    /// Create a new configuration with explicit values.
    pub fn new(
        service_id: impl Into<String>,
        template_id: impl Into<String>,
        public_key: impl Into<String>,
    ) -> Self {
        Self {
            api_url: Self::DEFAULT_API_URL.to_string(),
            service_id: service_id.into(),
            template_id: template_id.into(),
            public_key: public_key.into(),
            timeout: Duration::from_secs(20),
            private_key: None,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Missing ids leave the mailer unconfigured rather than failing, so the
    /// rest of the service still starts; see [`MailerConfig::is_configured`].
    ///
    /// - `EMAIL_SERVICE_ID` - Email service id
    /// - `EMAIL_TEMPLATE_ID` - Template id
    /// - `EMAIL_PUBLIC_KEY` - Account public key
    /// - `EMAIL_PRIVATE_KEY` - Optional account private key
    /// - `EMAIL_API_URL` - Default: https://api.emailjs.com
    /// - `EMAIL_TIMEOUT_SECS` - Default: 20
    pub fn from_env() -> Result<Self, MailerError> {
        let timeout = env::var("EMAIL_TIMEOUT_SECS")
            .unwrap_or_else(|_| "20".to_string())
            .parse::<u64>()
            .map_err(|e| MailerError::Config(format!("Invalid EMAIL_TIMEOUT_SECS: {}", e)))?;

        let mut config = Self::new(
            env::var("EMAIL_SERVICE_ID").unwrap_or_default(),
            env::var("EMAIL_TEMPLATE_ID").unwrap_or_default(),
            env::var("EMAIL_PUBLIC_KEY").unwrap_or_default(),
        )
        .with_timeout(Duration::from_secs(timeout));

        if let Ok(url) = env::var("EMAIL_API_URL") {
            config = config.with_api_url(url);
        }
        if let Ok(key) = env::var("EMAIL_PRIVATE_KEY") {
            if !key.trim().is_empty() {
                config = config.with_private_key(key);
            }
        }
        Ok(config)
    }

    /// Builder method to set the API base URL.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Builder method to set the private key.
    pub fn with_private_key(mut self, key: impl Into<String>) -> Self {
        self.private_key = Some(SecretString::from(key.into()));
        self
    }

    /// Builder method to set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Whether every id is set to a real value.
    pub fn is_configured(&self) -> bool {
        [&self.service_id, &self.template_id, &self.public_key]
            .iter()
            .all(|v| !v.trim().is_empty() && !v.starts_with(PLACEHOLDER_PREFIX))
    }

    /// Get the private key (exposes the secret).
    pub(crate) fn private_key(&self) -> Option<&str> {
        self.private_key.as_ref().map(|k| k.expose_secret())
    }

    /// Endpoint of a template send.
    pub fn send_url(&self) -> String {
        format!("{}/api/v1.0/email/send", self.api_url)
    }
}
