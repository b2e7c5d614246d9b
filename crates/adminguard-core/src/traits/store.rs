//! Key-value store trait for pluggable persistence backends.

use async_trait::async_trait;

use crate::result::AppResult;

/// Trait for durable client-side key-value stores (in-memory, JSON file,
/// browser storage).
///
/// All values are strings; callers serialize structured values as JSON.
/// Entries never expire on their own.
#[async_trait]
pub trait KeyValueStore: Send + Sync + std::fmt::Debug + 'static {
    /// Get a value by key. Returns `None` if the key does not exist.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Set a value, replacing any previous one.
    async fn set(&self, key: &str, value: &str) -> AppResult<()>;

    /// Delete a key. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Check whether a key exists.
    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.get(key).await?.is_some())
    }

    /// All keys currently stored, in no particular order.
    async fn keys(&self) -> AppResult<Vec<String>>;

    /// Check that the store is usable.
    async fn health_check(&self) -> AppResult<bool>;
}
