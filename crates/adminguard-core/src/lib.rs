//! # adminguard-core
//!
//! Core crate for AdminGuard. Contains the collaborator traits (backend,
//! key-value store, navigator), configuration schemas, the clock abstraction,
//! identity and settings types, auth/session events, and the unified error
//! system.
//!
//! This crate has **no** internal dependencies on other AdminGuard crates.

pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use clock::{Clock, SystemClock};
pub use error::AppError;
pub use result::AppResult;
