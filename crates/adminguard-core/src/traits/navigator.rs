//! Navigation capability used on logout and on blocked accounts.

use crate::types::redirect::Redirect;

/// Router seen from the session lifecycle: it only ever redirects.
pub trait Navigator: Send + Sync + 'static {
    /// Navigate to the given target.
    fn navigate(&self, redirect: &Redirect);
}
