//! Database models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A stored key/value pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct LocalEntry {
    /// Storage key (e.g., "votes_2025-03-05").
    pub key: String,
    /// Raw string value, usually JSON.
    pub value: String,
    /// Last update timestamp.
    pub updated_at: String,
}
