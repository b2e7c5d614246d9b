//! Admin identity resolution against the backend account table.

pub mod resolver;

pub use resolver::{IdentityResolution, IdentityResolver};
