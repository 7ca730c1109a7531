use std::time::Duration;

use async_trait::async_trait;
use cafeteria_core::{MailError, TemplateMailer};
use reqwest::Client;
use serde_json::Value;
use tracing::{info, instrument};

use crate::{MailerConfig, MailerError, SendRequest};

/// Client for sending template emails.
#[derive(Clone)]
pub struct MailerClient {
    http: Client,
    config: MailerConfig,
}

impl MailerClient {
    /// Create a new client with the given configuration.
    pub fn new(config: MailerConfig) -> Result<Self, MailerError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        info!(
            api = %config.api_url,
            service = %config.service_id,
            template = %config.template_id,
            configured = config.is_configured(),
            "Created email API client"
        );

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &MailerConfig {
        &self.config
    }

    /// Send the configured template to one address.
    #[instrument(skip(self, params), fields(to = %to))]
    pub async fn send(&self, to: &str, params: &Value) -> Result<(), MailerError> {
        if !self.config.is_configured() {
            return Err(MailerError::NotConfigured);
        }

        let body = SendRequest {
            service_id: &self.config.service_id,
            template_id: &self.config.template_id,
            user_id: &self.config.public_key,
            access_token: self.config.private_key(),
            template_params: params,
        };

        let response = self.http.post(self.config.send_url()).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailerError::Api {
                status: status.as_u16(),
                body,
            });
        }

        info!(to = %to, "Email sent successfully");
        Ok(())
    }
}

#[async_trait]
impl TemplateMailer for MailerClient {
    async fn send_template(&self, to: &str, params: &Value) -> Result<(), MailError> {
        Ok(self.send(to, params).await?)
    }

    fn is_configured(&self) -> bool {
        self.config.is_configured()
    }
}

impl std::fmt::Debug for MailerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailerClient")
            .field("api_url", &self.config.api_url)
            .field("configured", &self.config.is_configured())
            .finish()
    }
}
