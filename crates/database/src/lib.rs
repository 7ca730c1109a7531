//! SQLite local fallback store for the cafeteria service.
//!
//! This crate keeps the string key/value pairs (vote copies, the schedule
//! config, the last-sent guard) that the service falls back to when the
//! remote document store is unavailable. It uses SQLx with SQLite and
//! implements [`cafeteria_core::LocalStore`].
//!
//! # Example
//!
//! ```no_run
//! use database::{local_store, Database};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:cafeteria.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     local_store::set_value(db.pool(), "lastEmailSent", "2025-03-05").await?;
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod local_store;
pub mod models;

pub use error::{DatabaseError, Result};
pub use models::LocalEntry;

use async_trait::async_trait;
use cafeteria_core::{LocalStore, StoreError};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    const DEFAULT_POOL_SIZE: u32 = 5;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `?mode=rwc` to create the database file if it doesn't exist.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example() -> database::Result<()> {
    /// // File database
    /// let db = database::Database::connect("sqlite:data/cafeteria.db?mode=rwc").await?;
    ///
    /// // In-memory database (for testing)
    /// let db = database::Database::connect("sqlite::memory:").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!(
            "Connected to database: {} (pool size: {})",
            url,
            pool_size
        );

        Ok(Self { pool })
    }

    /// Run database migrations.
    ///
    /// This should be called once after connecting to ensure the schema is up to date.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl LocalStore for Database {
    async fn get(&self, key: &str) -> std::result::Result<Option<String>, StoreError> {
        Ok(local_store::get_value(&self.pool, key).await?)
    }

    async fn set(&self, key: &str, value: &str) -> std::result::Result<(), StoreError> {
        Ok(local_store::set_value(&self.pool, key, value).await?)
    }

    async fn remove(&self, key: &str) -> std::result::Result<(), StoreError> {
        Ok(local_store::remove_value(&self.pool, key).await?)
    }

    async fn keys_with_prefix(&self, prefix: &str) -> std::result::Result<Vec<String>, StoreError> {
        Ok(local_store::keys_with_prefix(&self.pool, prefix).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> Database {
        // A single connection keeps every query on the same in-memory database.
        let db = Database::connect_with_pool_size("sqlite::memory:", 1).await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_value_crud() {
        let db = test_db().await;

        // Create
        local_store::set_value(db.pool(), "autoEmailConfig", "{}").await.unwrap();
        let entry = local_store::get_entry(db.pool(), "autoEmailConfig").await.unwrap().unwrap();
        assert_eq!(entry.value, "{}");
        assert!(!entry.updated_at.is_empty());

        // Update
        local_store::set_value(db.pool(), "autoEmailConfig", r#"{"enabled":true}"#)
            .await
            .unwrap();
        let value = local_store::get_value(db.pool(), "autoEmailConfig").await.unwrap();
        assert_eq!(value.as_deref(), Some(r#"{"enabled":true}"#));

        // Delete
        local_store::remove_value(db.pool(), "autoEmailConfig").await.unwrap();
        let value = local_store::get_value(db.pool(), "autoEmailConfig").await.unwrap();
        assert!(value.is_none());

        // Deleting twice is fine
        local_store::remove_value(db.pool(), "autoEmailConfig").await.unwrap();
    }

    #[tokio::test]
    async fn test_prefix_is_literal() {
        let db = test_db().await;
        for key in ["votes_2025-03-02", "votes_2025-03-01", "votesX2025", "lastEmailSent"] {
            local_store::set_value(db.pool(), key, "{}").await.unwrap();
        }

        let keys = local_store::keys_with_prefix(db.pool(), "votes_").await.unwrap();
        assert_eq!(keys, vec!["votes_2025-03-01", "votes_2025-03-02"]);
    }

    #[tokio::test]
    async fn test_local_store_trait() {
        let db = test_db().await;
        let store: &dyn LocalStore = &db;

        store.set("lastEmailSent", "2025-03-05").await.unwrap();
        assert_eq!(store.get("lastEmailSent").await.unwrap().as_deref(), Some("2025-03-05"));
        assert_eq!(store.get("missing").await.unwrap(), None);

        store.remove("lastEmailSent").await.unwrap();
        assert!(store.keys_with_prefix("last").await.unwrap().is_empty());
    }
}
