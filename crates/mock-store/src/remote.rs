//! In-memory document store.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use cafeteria_core::{Document, RemoteStore, Result, StoreError};
use serde_json::Value;

type Collections = BTreeMap<String, BTreeMap<String, Value>>;

/// A [`RemoteStore`] backed by nested maps.
///
/// `set_available(false)` makes every call fail with
/// [`StoreError::Unavailable`], simulating a network outage.
#[derive(Debug)]
pub struct MemoryRemoteStore {
    docs: Mutex<Collections>,
    available: AtomicBool,
    next_id: AtomicU64,
}

impl Default for MemoryRemoteStore {
    fn default() -> Self {
        Self {
            docs: Mutex::new(BTreeMap::new()),
            available: AtomicBool::new(true),
            next_id: AtomicU64::new(1),
        }
    }
}

impl MemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, AtomicOrdering::SeqCst);
    }

    /// Insert a document directly, bypassing availability.
    pub fn seed(&self, collection: &str, id: &str, data: Value) {
        self.lock()
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), data);
    }

    /// Read a document directly, bypassing availability.
    pub fn snapshot(&self, collection: &str, id: &str) -> Option<Value> {
        self.lock().get(collection).and_then(|c| c.get(id)).cloned()
    }

    pub fn count(&self, collection: &str) -> usize {
        self.lock().get(collection).map_or(0, BTreeMap::len)
    }

    fn lock(&self) -> MutexGuard<'_, Collections> {
        self.docs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check(&self) -> Result<()> {
        if self.available.load(AtomicOrdering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("memory store switched off".to_string()))
        }
    }
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

#[async_trait]
impl RemoteStore for MemoryRemoteStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        self.check()?;
        Ok(self.snapshot(collection, id))
    }

    async fn set(&self, collection: &str, id: &str, data: &Value) -> Result<()> {
        self.check()?;
        self.seed(collection, id, data.clone());
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        self.check()?;
        if let Some(c) = self.lock().get_mut(collection) {
            c.remove(id);
        }
        Ok(())
    }

    async fn list(&self, collection: &str) -> Result<Vec<Document>> {
        self.check()?;
        Ok(self
            .lock()
            .get(collection)
            .map(|c| {
                c.iter()
                    .map(|(id, data)| Document {
                        id: id.clone(),
                        data: data.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn latest(&self, collection: &str, order_by: &str, limit: usize) -> Result<Vec<Document>> {
        let mut docs = self.list(collection).await?;
        docs.sort_by(|a, b| compare(b.data.get(order_by), a.data.get(order_by)));
        docs.truncate(limit);
        Ok(docs)
    }

    async fn add(&self, collection: &str, data: &Value) -> Result<String> {
        self.check()?;
        let id = format!("doc-{:06}", self.next_id.fetch_add(1, AtomicOrdering::SeqCst));
        self.seed(collection, &id, data.clone());
        Ok(id)
    }

    fn name(&self) -> &str {
        "MemoryRemoteStore"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_set_get_delete() {
        let store = MemoryRemoteStore::new();
        store.set("votes", "2025-03-05", &json!({"a": 1})).await.unwrap();
        assert_eq!(store.get("votes", "2025-03-05").await.unwrap(), Some(json!({"a": 1})));

        store.delete("votes", "2025-03-05").await.unwrap();
        assert_eq!(store.get("votes", "2025-03-05").await.unwrap(), None);
        // Deleting again is fine.
        store.delete("votes", "2025-03-05").await.unwrap();
    }

    #[tokio::test]
    async fn test_latest_orders_descending() {
        let store = MemoryRemoteStore::new();
        store.seed("menu_files", "a", json!({"date": "2025-03-01"}));
        store.seed("menu_files", "b", json!({"date": "2025-03-07"}));
        store.seed("menu_files", "c", json!({}));

        let latest = store.latest("menu_files", "date", 2).await.unwrap();
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].id, "b");
        assert_eq!(latest[1].id, "a");
    }

    #[tokio::test]
    async fn test_unavailable_fails_every_call() {
        let store = MemoryRemoteStore::new();
        store.set_available(false);
        assert!(matches!(
            store.get("votes", "x").await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(store.add("email_logs", &json!({})).await.is_err());
        assert_eq!(store.count("email_logs"), 0);
    }

    #[tokio::test]
    async fn test_add_assigns_distinct_ids() {
        let store = MemoryRemoteStore::new();
        let a = store.add("email_logs", &json!({"n": 1})).await.unwrap();
        let b = store.add("email_logs", &json!({"n": 2})).await.unwrap();
        assert_ne!(a, b);
        assert_eq!(store.count("email_logs"), 2);
    }
}
