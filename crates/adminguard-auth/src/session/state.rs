//! Published session state.
//!
//! Each field is a [`Published`] value: readers get the last value
//! synchronously and may subscribe to changes. Writes that would not change
//! the value do not wake subscribers.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;

use adminguard_core::types::user::AuthUser;

use crate::identity::IdentityResolution;

/// A value with a synchronous getter and change notifications.
#[derive(Debug)]
pub struct Published<T> {
    tx: watch::Sender<T>,
}

impl<T: Clone + PartialEq> Published<T> {
    /// Creates a published value.
    pub fn new(initial: T) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// The current value.
    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }

    /// Subscribe to changes. The receiver starts at the current value.
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }

    /// Replace the value. Returns whether it changed.
    pub(crate) fn set(&self, value: T) -> bool {
        self.tx.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        })
    }
}

impl<T: Clone + PartialEq + Default> Default for Published<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// Point-in-time copy of every session field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    /// Signed-in identity.
    pub user: Option<AuthUser>,
    /// Admin and not blocked, per the backend.
    pub is_admin: bool,
    /// A user is present.
    pub is_authenticated: bool,
    /// The account carries the admin flag.
    pub has_admin_email: bool,
    /// Bootstrap in progress.
    pub loading: bool,
    /// The timeout supervisor ended the last admin session.
    pub admin_session_expired: bool,
    /// Global site-login policy.
    pub require_site_login: bool,
    /// When the current admin session started.
    pub session_start: Option<DateTime<Utc>>,
}

/// The admin session's observable state.
#[derive(Debug)]
pub struct SessionState {
    user: Published<Option<AuthUser>>,
    is_admin: Published<bool>,
    is_authenticated: Published<bool>,
    loading: Published<bool>,
    has_admin_email: Published<bool>,
    require_site_login: Published<bool>,
    admin_session_expired: Published<bool>,
    session_start: Published<Option<DateTime<Utc>>>,
    /// Serializes identity writes so a resolution for a previous user is
    /// never applied over a newer one.
    identity: Mutex<()>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    /// Fresh state: no user, loading.
    pub fn new() -> Self {
        Self {
            user: Published::new(None),
            is_admin: Published::new(false),
            is_authenticated: Published::new(false),
            loading: Published::new(true),
            has_admin_email: Published::new(false),
            require_site_login: Published::new(false),
            admin_session_expired: Published::new(false),
            session_start: Published::new(None),
            identity: Mutex::new(()),
        }
    }

    pub fn user(&self) -> &Published<Option<AuthUser>> {
        &self.user
    }

    pub fn is_admin(&self) -> &Published<bool> {
        &self.is_admin
    }

    pub fn is_authenticated(&self) -> &Published<bool> {
        &self.is_authenticated
    }

    pub fn loading(&self) -> &Published<bool> {
        &self.loading
    }

    pub fn has_admin_email(&self) -> &Published<bool> {
        &self.has_admin_email
    }

    pub fn require_site_login(&self) -> &Published<bool> {
        &self.require_site_login
    }

    pub fn admin_session_expired(&self) -> &Published<bool> {
        &self.admin_session_expired
    }

    /// Start of the current admin session, if known.
    pub fn session_start(&self) -> Option<DateTime<Utc>> {
        self.session_start.get()
    }

    /// All fields at once.
    pub fn snapshot(&self) -> SessionSnapshot {
        let _guard = self.lock_identity();
        SessionSnapshot {
            user: self.user.get(),
            is_admin: self.is_admin.get(),
            is_authenticated: self.is_authenticated.get(),
            has_admin_email: self.has_admin_email.get(),
            loading: self.loading.get(),
            admin_session_expired: self.admin_session_expired.get(),
            require_site_login: self.require_site_login.get(),
            session_start: self.session_start.get(),
        }
    }

    /// Set the signed-in user; `is_authenticated` follows.
    ///
    /// A different user starts with no admin flags until their own
    /// resolution is applied.
    pub(crate) fn set_user(&self, user: Option<AuthUser>) {
        let _guard = self.lock_identity();
        let same_user = match (self.user.get(), user.as_ref()) {
            (Some(current), Some(next)) => current.id == next.id,
            _ => false,
        };
        if !same_user {
            self.is_admin.set(false);
            self.has_admin_email.set(false);
        }
        self.is_authenticated.set(user.is_some());
        self.user.set(user);
    }

    /// Apply a resolution computed for `user_id`.
    ///
    /// Returns `false`, leaving the flags untouched, when the current user
    /// is no longer `user_id`.
    pub(crate) fn apply_identity(&self, user_id: &str, resolution: IdentityResolution) -> bool {
        let _guard = self.lock_identity();
        let still_current = self.user.get().is_some_and(|u| u.id == user_id);
        if !still_current {
            return false;
        }
        self.is_admin.set(resolution.is_admin);
        self.has_admin_email.set(resolution.has_admin_email);
        true
    }

    /// Drop the user and every identity-derived flag.
    pub(crate) fn clear_identity(&self) {
        let _guard = self.lock_identity();
        self.user.set(None);
        self.is_authenticated.set(false);
        self.is_admin.set(false);
        self.has_admin_email.set(false);
    }

    pub(crate) fn set_loading(&self, loading: bool) {
        self.loading.set(loading);
    }

    pub(crate) fn set_require_site_login(&self, required: bool) {
        self.require_site_login.set(required);
    }

    pub(crate) fn set_admin_session_expired(&self, expired: bool) {
        self.admin_session_expired.set(expired);
    }

    pub(crate) fn set_session_start(&self, start: Option<DateTime<Utc>>) {
        self.session_start.set(start);
    }

    fn lock_identity(&self) -> MutexGuard<'_, ()> {
        self.identity.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
