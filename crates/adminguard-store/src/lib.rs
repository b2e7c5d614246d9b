//! # adminguard-store
//!
//! Key-value store implementations for AdminGuard and the persisted session
//! settings built on top of them. Supports two providers:
//!
//! - **memory**: In-process store using [moka](https://crates.io/crates/moka)
//! - **file**: A single JSON document on disk
//!
//! The provider is selected at runtime based on configuration.

#[cfg(feature = "file")]
pub mod file;
pub mod keys;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
pub mod settings;

pub use provider::StoreManager;
pub use settings::PersistedSettings;
