//! Core types and rules for the cafeteria lunch vote.
//!
//! This crate provides the shared interface used by every other crate in the
//! workspace. It defines:
//!
//! - [`RemoteStore`] / [`LocalStore`] - the two storage tiers
//! - [`TemplateMailer`] - the transactional email collaborator
//! - [`Repository`] - vote, schedule and send-log persistence with local fallback
//! - [`MenuResolver`] - today's menu file lookup across document shapes
//! - Pure rules: [`vote`], [`recipients`], [`schedule`], [`stats`], [`report`]
//!
//! # Example
//!
//! ```rust
//! use cafeteria_core::{stats, Ballot, Choice, DateKey, DayVotes};
//! use std::collections::BTreeMap;
//!
//! let today: DateKey = "2025-03-05".parse().unwrap();
//! let mut votes = DayVotes::default();
//! votes.push(Choice::Oui, Ballot::now("Alice"));
//!
//! let mut all = BTreeMap::new();
//! all.insert(today, votes);
//!
//! let dashboard = stats::dashboard(&all, today);
//! assert_eq!(dashboard.today.oui_percent, 100);
//! ```

mod date_key;
mod error;
mod models;
mod repository;
mod trait_def;

pub mod menu;
pub mod recipients;
pub mod report;
pub mod schedule;
pub mod stats;
pub mod vote;

pub use date_key::{local_now, DateKey, DateKeyError};
pub use error::{MailError, Result, StoreError};
pub use menu::{MenuResolver, MenuSource, ResolvedMenu, DEFAULT_MENU_URL};
pub use models::{
    Ballot, Choice, DayVotes, HostedFile, Language, LegacyMenuImage, MenuFileDocument,
    MenuFileKind, MenuFileView, ScheduleConfig, ScheduleDocument, SendLog, SendLogEntry,
    SendSource, VoteDocument,
};
pub use repository::{collections, keys, Repository, Tier};
pub use trait_def::{Document, LocalStore, RemoteStore, TemplateMailer};

// Re-export async_trait for implementors
pub use async_trait::async_trait;
