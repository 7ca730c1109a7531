//! In-memory collaborators for testing the cafeteria service.
//!
//! This crate provides implementations of the `cafeteria-core` traits:
//! - `MemoryRemoteStore` - document store kept in memory, can be switched off
//! - `MemoryLocalStore` - key/value fallback store kept in memory
//! - `RecordingMailer` - records every send, can fail for chosen addresses
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use cafeteria_core::{Ballot, Choice, DateKey, DayVotes, Repository, Tier};
//! use mock_store::{MemoryLocalStore, MemoryRemoteStore};
//!
//! #[tokio::main]
//! async fn main() {
//!     let remote = Arc::new(MemoryRemoteStore::new());
//!     let repo = Repository::new(remote.clone(), Arc::new(MemoryLocalStore::new()));
//!
//!     remote.set_available(false);
//!     let today: DateKey = "2025-03-05".parse().unwrap();
//!     let mut votes = DayVotes::default();
//!     votes.push(Choice::Oui, Ballot::now("Alice"));
//!
//!     assert_eq!(repo.save_votes(today, &votes).await.unwrap(), Tier::Local);
//!     assert_eq!(repo.load_votes(today).await, votes);
//! }
//! ```

mod local;
mod mailer;
mod remote;

pub use cafeteria_core::{async_trait, LocalStore, RemoteStore, TemplateMailer};

pub use local::MemoryLocalStore;
pub use mailer::RecordingMailer;
pub use remote::MemoryRemoteStore;
