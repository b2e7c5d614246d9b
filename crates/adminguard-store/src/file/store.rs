//! JSON-file key-value store.

use std::collections::BTreeMap;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use adminguard_core::error::{AppError, ErrorKind};
use adminguard_core::result::AppResult;
use adminguard_core::traits::store::KeyValueStore;

/// Key-value store persisted as one JSON object on disk.
///
/// The document is read lazily on first access and rewritten in full on
/// every mutation (write to a sibling temp file, then rename). A missing
/// file is an empty store; a corrupt file is logged and treated as empty,
/// and is replaced by the next write.
#[derive(Debug)]
pub struct FileStore {
    /// Location of the JSON document.
    path: PathBuf,
    /// Loaded entries; `None` until first access.
    entries: Mutex<Option<BTreeMap<String, String>>>,
}

impl FileStore {
    /// Create a store backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: Mutex::new(None),
        }
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(path: &Path) -> AppResult<BTreeMap<String, String>> {
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == IoErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to read store file {}: {e}", path.display()),
                    e,
                ));
            }
        };

        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        match serde_json::from_str(&raw) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "Store file is corrupt, starting from an empty store"
                );
                Ok(BTreeMap::new())
            }
        }
    }

    async fn persist(&self, entries: &BTreeMap<String, String>) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        debug!(path = %self.path.display(), count = entries.len(), "Store file written");
        Ok(())
    }

    /// Run `f` against the loaded entries, loading them first if needed.
    async fn with_entries<T>(
        &self,
        f: impl FnOnce(&mut BTreeMap<String, String>) -> (T, bool),
    ) -> AppResult<T> {
        let mut guard = self.entries.lock().await;
        if guard.is_none() {
            *guard = Some(Self::load(&self.path).await?);
        }
        let entries = guard.get_or_insert_with(BTreeMap::new);

        let (result, dirty) = f(entries);
        if dirty {
            self.persist(entries).await?;
        }
        Ok(result)
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.with_entries(|entries| (entries.get(key).cloned(), false))
            .await
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.with_entries(|entries| {
            let changed = entries.get(key).map(String::as_str) != Some(value);
            if changed {
                entries.insert(key.to_string(), value.to_string());
            }
            ((), changed)
        })
        .await
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.with_entries(|entries| ((), entries.remove(key).is_some()))
            .await
    }

    async fn keys(&self) -> AppResult<Vec<String>> {
        self.with_entries(|entries| (entries.keys().cloned().collect(), false))
            .await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.with_entries(|_| ((), false)).await?;
        Ok(true)
    }
}
