//! # mailer
//!
//! Client for a template-based transactional email API. The template is
//! stored on the provider side; a send only carries the recipient and the
//! template variables.
//!
//! ```no_run
//! use mailer::{MailerClient, MailerConfig};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mailer::MailerError> {
//!     let config = MailerConfig::from_env()?;
//!     let client = MailerClient::new(config)?;
//!
//!     client
//!         .send("chef@cantine.be", &json!({ "to_email": "chef@cantine.be", "oui_count": 3 }))
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
mod types;

pub use client::MailerClient;
pub use config::MailerConfig;
pub use error::MailerError;
pub use types::SendRequest;
