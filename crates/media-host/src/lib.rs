//! Menu file host client.
//!
//! This crate talks to the image/file hosting service that stores the daily
//! menu. It supports:
//!
//! - Validating a file before upload (type and size)
//! - Unsigned uploads to the image or raw endpoint depending on the kind
//! - Building transformation URLs (preview, modal view, PDF thumbnail)
//!
//! # Example
//!
//! ```no_run
//! use cafeteria_core::DateKey;
//! use media_host::{transform, MediaClient, MediaConfig, MenuUpload};
//!
//! # async fn example() -> Result<(), media_host::HostError> {
//! let client = MediaClient::new(MediaConfig::new("demo-cloud", "menu-uploads"))?;
//!
//! let upload = MenuUpload::new("menu.png", "image/png", std::fs::read("menu.png")?);
//! let hosted = client.upload(DateKey::today(), upload).await?;
//!
//! println!("preview: {}", transform::preview_url(&hosted.url));
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod transform;
pub mod types;
pub mod validation;

pub use client::MediaClient;
pub use config::MediaConfig;
pub use error::{HostError, UploadError};
pub use types::MenuUpload;
