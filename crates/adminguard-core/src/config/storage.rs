//! Persisted key-value store configuration.

use serde::{Deserialize, Serialize};

/// Key-value store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Store provider type: `"memory"` or `"file"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Path of the JSON file used by the `"file"` provider.
    #[serde(default = "default_path")]
    pub path: String,
    /// Maximum number of entries kept by the `"memory"` provider.
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            path: default_path(),
            max_capacity: default_max_capacity(),
        }
    }
}

fn default_provider() -> String {
    "file".to_string()
}

fn default_path() -> String {
    "data/adminguard-store.json".to_string()
}

fn default_max_capacity() -> u64 {
    1_000
}
