//! Key/value storage backing the local fallback tier.

use sqlx::SqlitePool;

use crate::models::LocalEntry;
use crate::Result;

/// Create or update an entry.
pub async fn set_value(pool: &SqlitePool, key: &str, value: &str) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO local_store (key, value)
        VALUES (?, ?)
        ON CONFLICT(key) DO UPDATE SET
            value = excluded.value,
            updated_at = datetime('now')
        "#,
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;

    Ok(())
}

/// Get an entry by key.
pub async fn get_entry(pool: &SqlitePool, key: &str) -> Result<Option<LocalEntry>> {
    let record = sqlx::query_as::<_, LocalEntry>(
        r#"
        SELECT key, value, updated_at
        FROM local_store
        WHERE key = ?
        "#,
    )
    .bind(key)
    .fetch_optional(pool)
    .await?;

    Ok(record)
}

/// Get only the value of an entry.
pub async fn get_value(pool: &SqlitePool, key: &str) -> Result<Option<String>> {
    Ok(get_entry(pool, key).await?.map(|e| e.value))
}

/// Remove an entry. Removing a missing key is not an error.
pub async fn remove_value(pool: &SqlitePool, key: &str) -> Result<()> {
    sqlx::query(
        r#"
        DELETE FROM local_store
        WHERE key = ?
        "#,
    )
    .bind(key)
    .execute(pool)
    .await?;

    Ok(())
}

/// Keys starting with `prefix`, sorted.
///
/// Compares a literal prefix; `_` and `%` are not wildcards here.
pub async fn keys_with_prefix(pool: &SqlitePool, prefix: &str) -> Result<Vec<String>> {
    let keys = sqlx::query_scalar::<_, String>(
        r#"
        SELECT key
        FROM local_store
        WHERE substr(key, 1, length(?)) = ?
        ORDER BY key
        "#,
    )
    .bind(prefix)
    .bind(prefix)
    .fetch_all(pool)
    .await?;

    Ok(keys)
}
