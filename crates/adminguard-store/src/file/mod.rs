//! Key-value store persisted as a single JSON document.

pub mod store;

pub use store::FileStore;
