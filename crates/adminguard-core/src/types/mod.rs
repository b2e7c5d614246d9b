//! Core type definitions used across the AdminGuard workspace.

pub mod page;
pub mod redirect;
pub mod settings;
pub mod user;

pub use page::{ActivityKind, PageEvent};
pub use redirect::Redirect;
pub use settings::{SecuritySettingsRecord, TimeoutSettings};
pub use user::{AccountRecord, AuthUser};
