//! Re-resolves admin identity when the page returns to the foreground.

use tracing::{debug, info};

use crate::identity::{IdentityResolution, IdentityResolver};

use super::state::SessionState;

/// Foreground revalidation of the signed-in user's admin flags.
#[derive(Debug, Clone)]
pub struct Revalidator {
    resolver: IdentityResolver,
}

impl Revalidator {
    pub fn new(resolver: IdentityResolver) -> Self {
        Self { resolver }
    }

    /// Re-run identity resolution for the current user, if any.
    ///
    /// Returns the resolution when it was applied. A result computed for a
    /// user who has since changed is dropped.
    pub async fn revalidate(&self, state: &SessionState) -> Option<IdentityResolution> {
        let user = state.user().get()?;
        let resolution = self.resolver.resolve(user.email_or_empty()).await;

        if !state.apply_identity(&user.id, resolution) {
            debug!(user_id = %user.id, "User changed during revalidation; result dropped");
            return None;
        }

        info!(
            user_id = %user.id,
            is_admin = resolution.is_admin,
            has_admin_email = resolution.has_admin_email,
            "Admin identity revalidated"
        );
        Some(resolution)
    }

    /// Visibility change: revalidate only when the page became visible.
    pub async fn on_visibility_changed(
        &self,
        state: &SessionState,
        hidden: bool,
    ) -> Option<IdentityResolution> {
        if hidden {
            return None;
        }
        self.revalidate(state).await
    }
}
