//! In-memory key/value store.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use cafeteria_core::{LocalStore, Result, StoreError};

/// A [`LocalStore`] backed by a sorted map.
#[derive(Debug)]
pub struct MemoryLocalStore {
    entries: Mutex<BTreeMap<String, String>>,
    available: AtomicBool,
}

impl Default for MemoryLocalStore {
    fn default() -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
            available: AtomicBool::new(true),
        }
    }
}

impl MemoryLocalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn seed(&self, key: &str, value: &str) {
        self.lock().insert(key.to_string(), value.to_string());
    }

    pub fn entry(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check(&self) -> Result<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Local("memory store switched off".to_string()))
        }
    }
}

#[async_trait]
impl LocalStore for MemoryLocalStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.check()?;
        Ok(self.entry(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.check()?;
        self.seed(key, value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.check()?;
        self.lock().remove(key);
        Ok(())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        self.check()?;
        Ok(self
            .lock()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_prefix_scan_is_literal_and_sorted() {
        let store = MemoryLocalStore::new();
        store.set("votes_2025-03-02", "{}").await.unwrap();
        store.set("votes_2025-03-01", "{}").await.unwrap();
        store.set("votesX", "{}").await.unwrap();
        store.set("lastEmailSent", "2025-03-01").await.unwrap();

        let keys = store.keys_with_prefix("votes_").await.unwrap();
        assert_eq!(keys, vec!["votes_2025-03-01", "votes_2025-03-02"]);
    }

    #[tokio::test]
    async fn test_remove() {
        let store = MemoryLocalStore::new();
        store.set("k", "v").await.unwrap();
        store.remove("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }
}
