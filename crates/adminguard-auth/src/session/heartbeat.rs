//! Database keep-alive while an admin session is active.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::time;
use tracing::info;

use super::manager::AdminSessionManager;

/// Calls the backend heartbeat on the configured interval.
///
/// The interval is re-read after every beat, so saved settings take effect
/// without a restart.
#[derive(Debug)]
pub struct HeartbeatTask {
    manager: Arc<AdminSessionManager>,
}

impl HeartbeatTask {
    pub fn new(manager: Arc<AdminSessionManager>) -> Self {
        Self { manager }
    }

    /// Run until the cancel flag flips.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        info!("Heartbeat task started");

        loop {
            let period = self.manager.timeout_settings().heartbeat_interval();

            tokio::select! {
                _ = time::sleep(period) => {
                    self.manager.send_heartbeat().await;
                }
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        info!("Heartbeat task shutting down");
                        break;
                    }
                }
            }
        }
    }
}
