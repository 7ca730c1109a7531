//! File host HTTP client.

use cafeteria_core::{DateKey, HostedFile, MenuFileKind};
use chrono::Utc;
use rand::Rng;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::{debug, info, instrument, warn};

use crate::config::MediaConfig;
use crate::error::HostError;
use crate::types::{MenuUpload, UploadResponse};
use crate::validation;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Provider id for a new menu file: `menu_<date>_<millis>_<9 random chars>`.
pub fn new_public_id(date: DateKey) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..9)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("menu_{}_{}_{}", date, Utc::now().timestamp_millis(), suffix)
}

/// Client for the file host.
#[derive(Clone)]
pub struct MediaClient {
    http: Client,
    config: MediaConfig,
}

impl MediaClient {
    pub fn new(config: MediaConfig) -> Result<Self, HostError> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    /// Get the configuration.
    pub fn config(&self) -> &MediaConfig {
        &self.config
    }

    /// Validate and upload a menu file for `date`.
    #[instrument(skip(self, upload), fields(file = %upload.file_name, size = upload.bytes.len()))]
    pub async fn upload(&self, date: DateKey, upload: MenuUpload) -> Result<HostedFile, HostError> {
        let kind = validation::validate(&upload.content_type, upload.bytes.len())?;
        if !self.config.is_configured() {
            return Err(HostError::NotConfigured);
        }

        let public_id = new_public_id(date);
        let url = self.config.upload_url(kind);
        debug!(url = %url, public_id = %public_id, "Uploading menu file");

        let part = Part::bytes(upload.bytes)
            .file_name(upload.file_name.clone())
            .mime_str(&upload.content_type)?;
        let mut form = Form::new()
            .part("file", part)
            .text("upload_preset", self.config.upload_preset.clone())
            .text("public_id", public_id)
            .text("folder", self.config.folder.clone());
        if kind == MenuFileKind::Pdf {
            form = form.text("resource_type", "raw");
        }

        let response = self.http.post(&url).multipart(form).send().await?;
        let status = response.status();
        let body: UploadResponse = response.json().await?;

        if let Some(error) = body.error {
            return Err(HostError::Api {
                status: status.as_u16(),
                message: error.message,
            });
        }
        if !status.is_success() {
            return Err(HostError::Api {
                status: status.as_u16(),
                message: format!("HTTP error! status: {}", status),
            });
        }

        let (Some(secure_url), Some(public_id)) = (body.secure_url, body.public_id) else {
            return Err(HostError::Api {
                status: status.as_u16(),
                message: "response missing secure_url or public_id".to_string(),
            });
        };

        info!(url = %secure_url, kind = kind.as_str(), "Menu file uploaded");
        Ok(HostedFile {
            url: secure_url,
            public_id,
            kind,
            original_filename: body.original_filename.or(Some(upload.file_name)),
        })
    }

    /// Whether a hosted file still answers.
    pub async fn exists(&self, url: &str) -> bool {
        match self.http.head(url).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                warn!(url, error = %e, "File check failed");
                false
            }
        }
    }

    /// PDF thumbnail for a hosted file, if it is one.
    pub fn pdf_thumbnail_url(&self, url: &str) -> Option<String> {
        crate::transform::pdf_thumbnail_url(url, &self.config.delivery_domain)
    }
}

impl std::fmt::Debug for MediaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaClient")
            .field("cloud_name", &self.config.cloud_name)
            .field("folder", &self.config.folder)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_id_shape() {
        let date: DateKey = "2025-03-05".parse().unwrap();
        let id = new_public_id(date);
        let parts: Vec<&str> = id.split('_').collect();

        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0], "menu");
        assert_eq!(parts[1], "2025-03-05");
        assert!(parts[2].parse::<i64>().is_ok());
        assert_eq!(parts[3].len(), 9);
        assert!(parts[3].chars().all(|c| c.is_ascii_alphanumeric() && !c.is_ascii_uppercase()));
        assert_ne!(id, new_public_id(date));
    }
}
