//! Admin session lifecycle: published state, activity tracking, timeout
//! supervision, blocked-account checks and foreground revalidation.

pub mod activity;
pub mod blocked;
pub mod heartbeat;
pub mod manager;
pub mod revalidate;
pub mod state;
pub mod supervisor;

pub use activity::ActivityTracker;
pub use blocked::{BlockedCheck, BlockedStatusPoller};
pub use heartbeat::HeartbeatTask;
pub use manager::{AdminSessionManager, SessionDeps};
pub use revalidate::Revalidator;
pub use state::{Published, SessionSnapshot, SessionState};
pub use supervisor::{TimeoutSupervisor, check_expiry};
