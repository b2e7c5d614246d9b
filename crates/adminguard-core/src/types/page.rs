//! Platform signals delivered by the embedding page.

use serde::{Deserialize, Serialize};

/// Kind of user interaction that counts as activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    /// Mouse or pen movement and clicks.
    Pointer,
    /// Key presses.
    Keyboard,
    /// Scrolling.
    Scroll,
    /// Touch start/move.
    Touch,
}

/// A page-level event the session manager reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PageEvent {
    /// The window regained focus.
    Focus,
    /// Document visibility changed.
    VisibilityChanged {
        /// Whether the document is now hidden.
        hidden: bool,
    },
    /// The user interacted with the page.
    Activity {
        /// What kind of interaction.
        kind: ActivityKind,
    },
    /// The router finished navigating to a new path.
    Navigation {
        /// The path navigated to.
        path: String,
    },
}
