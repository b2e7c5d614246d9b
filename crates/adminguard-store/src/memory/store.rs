//! In-memory store implementation using the moka crate.

use async_trait::async_trait;
use moka::future::Cache;
use tracing::debug;

use adminguard_core::result::AppResult;
use adminguard_core::traits::store::KeyValueStore;

/// In-memory key-value store using moka.
///
/// Entries live until deleted or evicted by capacity. Nothing survives a
/// restart, so this provider suits tests and single-run tools.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    /// The underlying moka cache.
    cache: Cache<String, String>,
}

impl MemoryStore {
    /// Create a new in-memory store holding at most `max_capacity` entries.
    pub fn new(max_capacity: u64) -> Self {
        let cache = Cache::builder().max_capacity(max_capacity).build();
        Self { cache }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(1_000)
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.cache.get(key).await)
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.cache.insert(key.to_string(), value.to_string()).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        if self.cache.remove(key).await.is_some() {
            debug!(key, "Removed key from memory store");
        }
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.cache.contains_key(key))
    }

    async fn keys(&self) -> AppResult<Vec<String>> {
        Ok(self
            .cache
            .iter()
            .map(|(key, _)| key.as_ref().clone())
            .collect())
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
