//! Configuration types for media-host.

use std::env;
use std::time::Duration;

use cafeteria_core::MenuFileKind;

use crate::error::HostError;

/// Configuration for the file host.
#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// Upload API base URL (default: https://api.cloudinary.com/v1_1).
    pub api_url: String,
    /// Account (cloud) name.
    pub cloud_name: String,
    /// Unsigned upload preset.
    pub upload_preset: String,
    /// Destination folder (default: cafeteria-menus).
    pub folder: String,
    /// Domain of delivery URLs, used to recognise hosted PDFs.
    pub delivery_domain: String,
    /// Request timeout (default: 60s).
    pub timeout: Duration,
}

impl MediaConfig {
    pub const DEFAULT_API_URL: &'static str = "https://api.cloudinary.com/v1_1";
    pub const DEFAULT_FOLDER: &'static str = "cafeteria-menus";

    /// Create a new configuration with the given account and preset.
    pub fn new(cloud_name: impl Into<String>, upload_preset: impl Into<String>) -> Self {
        Self {
            api_url: Self::DEFAULT_API_URL.to_string(),
            cloud_name: cloud_name.into(),
            upload_preset: upload_preset.into(),
            folder: Self::DEFAULT_FOLDER.to_string(),
            delivery_domain: "cloudinary.com".to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Create configuration from environment variables.
    ///
    /// - `MEDIA_CLOUD_NAME` - Account name (uploads disabled when unset)
    /// - `MEDIA_UPLOAD_PRESET` - Unsigned preset (uploads disabled when unset)
    /// - `MEDIA_FOLDER` - Default: cafeteria-menus
    /// - `MEDIA_API_URL` - Default: https://api.cloudinary.com/v1_1
    /// - `MEDIA_TIMEOUT_SECS` - Default: 60
    pub fn from_env() -> Result<Self, HostError> {
        let timeout = env::var("MEDIA_TIMEOUT_SECS")
            .unwrap_or_else(|_| "60".to_string())
            .parse::<u64>()
            .map_err(|e| HostError::Config(format!("Invalid MEDIA_TIMEOUT_SECS: {}", e)))?;

        let mut config = Self::new(
            env::var("MEDIA_CLOUD_NAME").unwrap_or_default(),
            env::var("MEDIA_UPLOAD_PRESET").unwrap_or_default(),
        )
        .with_timeout(Duration::from_secs(timeout));

        if let Ok(folder) = env::var("MEDIA_FOLDER") {
            config = config.with_folder(folder);
        }
        if let Ok(url) = env::var("MEDIA_API_URL") {
            config = config.with_api_url(url);
        }
        Ok(config)
    }

    /// Builder method to set the folder.
    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = folder.into();
        self
    }

    /// Builder method to set the API base URL.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Builder method to set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_configured(&self) -> bool {
        !self.cloud_name.trim().is_empty() && !self.upload_preset.trim().is_empty()
    }

    /// Upload endpoint for a file kind: images go to `image`, PDFs to `raw`.
    pub fn upload_url(&self, kind: MenuFileKind) -> String {
        let resource = match kind {
            MenuFileKind::Image => "image",
            MenuFileKind::Pdf => "raw",
        };
        format!("{}/{}/{}/upload", self.api_url, self.cloud_name, resource)
    }
}
