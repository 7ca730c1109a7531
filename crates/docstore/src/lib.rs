//! Document database client library.
//!
//! This crate provides a Rust client for the remote document database that
//! holds per-day votes, menu records, the report schedule and send logs. It
//! implements [`cafeteria_core::RemoteStore`] so the repository can use it
//! as its primary tier.
//!
//! # Example
//!
//! ```no_run
//! use cafeteria_core::RemoteStore;
//! use docstore::{DocStoreClient, DocStoreConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = DocStoreConfig::new("https://db.example.com").with_api_key("secret");
//! let client = DocStoreClient::new(config)?;
//!
//! if let Some(doc) = client.get("votes", "2025-03-05").await? {
//!     println!("{doc}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use client::DocStoreClient;
pub use config::DocStoreConfig;
pub use error::DocStoreError;
