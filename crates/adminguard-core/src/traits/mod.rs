//! Collaborator traits defined in `adminguard-core` and implemented by
//! other crates or by the embedding application.

pub mod backend;
pub mod navigator;
pub mod store;

pub use backend::Backend;
pub use navigator::Navigator;
pub use store::KeyValueStore;
