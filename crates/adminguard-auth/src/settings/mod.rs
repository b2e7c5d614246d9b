//! Admin-editable security settings.

pub mod service;

pub use service::{SecuritySettings, TimeoutSettingsService};
