//! In-memory cache backend.
//!
//! A string-keyed map under an async-aware read-write lock, standing in for
//! an external key-value cache in development and tests. `del_many` removes
//! every key under a single lock acquisition, the in-process analogue of a
//! pipelined delete.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use mea::rwlock::RwLock;

use recache_core::{backend::CacheBackend, error::RecordStoreResult};

/// Thread-safe in-memory cache backend.
///
/// Cloneable; clones share the same underlying entries.
#[derive(Default, Clone, Debug)]
pub struct InMemoryCache {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryCache {
    /// Creates a new empty cache.
    pub fn new() -> Self {
        Self { entries: Arc::new(RwLock::new(HashMap::new())) }
    }

    /// Number of entries currently cached.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl CacheBackend for InMemoryCache {
    async fn get(&self, key: &str) -> RecordStoreResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> RecordStoreResult<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());

        Ok(())
    }

    async fn del(&self, key: &str) -> RecordStoreResult<()> {
        self.entries.write().await.remove(key);

        Ok(())
    }

    async fn del_many(&self, keys: &[String]) -> RecordStoreResult<()> {
        let mut entries = self.entries.write().await;
        for key in keys {
            entries.remove(key);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_del_round_trip() {
        let cache = InMemoryCache::new();

        cache.set("k1", "v1").await.unwrap();
        assert_eq!(cache.get("k1").await.unwrap().as_deref(), Some("v1"));

        cache.del("k1").await.unwrap();
        assert_eq!(cache.get("k1").await.unwrap(), None);

        // Deleting an absent key is not an error.
        cache.del("k1").await.unwrap();
    }

    #[tokio::test]
    async fn del_many_removes_all_given_keys() {
        let cache = InMemoryCache::new();
        cache.set("a", "1").await.unwrap();
        cache.set("b", "2").await.unwrap();
        cache.set("c", "3").await.unwrap();

        cache
            .del_many(&["a".to_string(), "b".to_string(), "missing".to_string()])
            .await
            .unwrap();

        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get("c").await.unwrap().as_deref(), Some("3"));
    }
}
