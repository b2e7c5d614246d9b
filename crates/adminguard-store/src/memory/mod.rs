//! In-memory key-value store backed by moka.

pub mod store;

pub use store::MemoryStore;
