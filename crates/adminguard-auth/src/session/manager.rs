//! Admin session lifecycle manager: bootstrap, auth notifications, page
//! events, timeouts, blocked accounts and logout.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use adminguard_core::clock::{Clock, SystemClock};
use adminguard_core::config::SessionConfig;
use adminguard_core::events::{AuthEvent, DomainEvent, ExpiryReason, SessionEvent};
use adminguard_core::result::AppResult;
use adminguard_core::traits::backend::Backend;
use adminguard_core::traits::navigator::Navigator;
use adminguard_core::traits::store::KeyValueStore;
use adminguard_core::types::page::PageEvent;
use adminguard_core::types::redirect::Redirect;
use adminguard_core::types::settings::TimeoutSettings;
use adminguard_core::types::user::AuthUser;
use adminguard_store::settings::PersistedSettings;

use crate::identity::{IdentityResolution, IdentityResolver};
use crate::mfa::MfaChallengeFlow;
use crate::settings::TimeoutSettingsService;

use super::activity::ActivityTracker;
use super::blocked::{BlockedCheck, BlockedStatusPoller};
use super::heartbeat::HeartbeatTask;
use super::revalidate::Revalidator;
use super::state::{SessionSnapshot, SessionState};
use super::supervisor::{self, TimeoutSupervisor};

/// Collaborators the manager is built from.
#[derive(Clone)]
pub struct SessionDeps {
    /// Backend client.
    pub backend: Arc<dyn Backend>,
    /// Durable key-value store for the session marker and settings cache.
    pub store: Arc<dyn KeyValueStore>,
    /// Router used on logout and blocked accounts.
    pub navigator: Arc<dyn Navigator>,
    /// Time source.
    pub clock: Arc<dyn Clock>,
    /// Supervision knobs.
    pub config: SessionConfig,
}

impl std::fmt::Debug for SessionDeps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionDeps")
            .field("store", &self.store)
            .field("clock", &self.clock)
            .field("config", &self.config)
            .finish()
    }
}

impl SessionDeps {
    /// Dependencies using the system clock.
    pub fn new(
        backend: Arc<dyn Backend>,
        store: Arc<dyn KeyValueStore>,
        navigator: Arc<dyn Navigator>,
        config: SessionConfig,
    ) -> Self {
        Self {
            backend,
            store,
            navigator,
            clock: Arc::new(SystemClock),
            config,
        }
    }

    /// Replace the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

/// Owns the admin session state and everything that mutates it.
pub struct AdminSessionManager {
    backend: Arc<dyn Backend>,
    navigator: Arc<dyn Navigator>,
    clock: Arc<dyn Clock>,
    config: SessionConfig,
    persisted: PersistedSettings,
    state: SessionState,
    activity: ActivityTracker,
    resolver: IdentityResolver,
    blocked: BlockedStatusPoller,
    revalidator: Revalidator,
    settings: TimeoutSettingsService,
    /// Outbound session events.
    events: broadcast::Sender<DomainEvent>,
    /// Background task shutdown flag.
    shutdown: watch::Sender<bool>,
    /// Spawned background tasks.
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl std::fmt::Debug for AdminSessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSessionManager")
            .field("config", &self.config)
            .field("state", &self.state.snapshot())
            .finish()
    }
}

impl AdminSessionManager {
    /// Build a manager without bootstrapping it or spawning any task.
    ///
    /// Use [`AdminSessionManager::start`] in applications.
    pub fn new(deps: SessionDeps) -> Arc<Self> {
        let SessionDeps {
            backend,
            store,
            navigator,
            clock,
            config,
        } = deps;

        let persisted = PersistedSettings::new(store);
        let resolver = IdentityResolver::new(Arc::clone(&backend));
        let blocked = BlockedStatusPoller::new(
            resolver.clone(),
            Arc::clone(&clock),
            config.blocked_check_cooldown_seconds,
        );
        let settings = TimeoutSettingsService::new(Arc::clone(&backend), persisted.clone());
        let (events, _) = broadcast::channel(config.event_channel_capacity.max(1));
        let (shutdown, _) = watch::channel(false);

        Arc::new(Self {
            activity: ActivityTracker::new(Arc::clone(&clock)),
            revalidator: Revalidator::new(resolver.clone()),
            state: SessionState::new(),
            backend,
            navigator,
            clock,
            config,
            persisted,
            resolver,
            blocked,
            settings,
            events,
            shutdown,
            tasks: Mutex::new(Vec::new()),
        })
    }

    /// Build, bootstrap, and start the background tasks: the auth
    /// notification listener, the timeout supervisor and the heartbeat.
    pub async fn start(deps: SessionDeps) -> Arc<Self> {
        let manager = Self::new(deps);
        // Subscribe before bootstrapping so no notification is missed.
        let auth_events = manager.backend.subscribe();
        manager.initialize().await;
        manager.spawn_background(auth_events);
        manager
    }

    /// Bootstrap: restore the session marker, load settings, and adopt an
    /// existing backend session. `loading` is cleared when done, whatever
    /// the outcome.
    pub async fn initialize(&self) {
        let marker = self.persisted.load_session_start().await;
        self.state.set_session_start(marker);

        let settings = self.settings.load().await;
        self.state
            .set_require_site_login(settings.require_site_login);

        match self.backend.current_session().await {
            Ok(Some(user)) => {
                info!(user_id = %user.id, "Restoring existing session");
                self.state.set_user(Some(user.clone()));
                let resolution = self.resolve_for(&user).await;
                if marker.is_none() {
                    self.start_session_clock().await;
                }
                debug!(
                    user_id = %user.id,
                    is_admin = resolution.is_admin,
                    "Existing session restored"
                );
            }
            Ok(None) => debug!("No existing session"),
            Err(e) => warn!(error = %e, "Failed to read existing session"),
        }

        self.state.set_loading(false);
    }

    fn spawn_background(self: &Arc<Self>, mut auth_events: broadcast::Receiver<AuthEvent>) {
        let mut handles = Vec::with_capacity(3);

        let manager = Arc::clone(self);
        let mut cancel = self.shutdown.subscribe();
        handles.push(tokio::spawn(async move {
            loop {
                tokio::select! {
                    event = auth_events.recv() => match event {
                        Ok(event) => manager.handle_auth_event(event).await,
                        Err(RecvError::Lagged(skipped)) => {
                            warn!(skipped, "Auth notification listener lagged");
                        }
                        Err(RecvError::Closed) => {
                            info!("Auth notification channel closed");
                            break;
                        }
                    },
                    changed = cancel.changed() => {
                        if changed.is_err() || *cancel.borrow() {
                            break;
                        }
                    }
                }
            }
        }));

        let supervisor =
            TimeoutSupervisor::new(Arc::clone(self), self.config.supervisor_interval_seconds);
        let cancel = self.shutdown.subscribe();
        handles.push(tokio::spawn(async move { supervisor.run(cancel).await }));

        let heartbeat = HeartbeatTask::new(Arc::clone(self));
        let cancel = self.shutdown.subscribe();
        handles.push(tokio::spawn(async move { heartbeat.run(cancel).await }));

        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(handles);
    }

    /// Stop the background tasks and wait for them to finish.
    pub async fn shutdown(&self) {
        let _ = self.shutdown.send(true);
        let handles: Vec<_> = self
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();

        for result in futures::future::join_all(handles).await {
            if let Err(e) = result {
                warn!(error = %e, "Session background task ended abnormally");
            }
        }
        info!("Admin session manager stopped");
    }

    // ── Accessors ──────────────────────────────────────────────

    /// Observable session state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Copy of every session field.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.snapshot()
    }

    /// The effective timeout limits.
    pub fn timeout_settings(&self) -> TimeoutSettings {
        self.settings.current()
    }

    /// Settings service, for the settings screen.
    pub fn settings(&self) -> &TimeoutSettingsService {
        &self.settings
    }

    /// Identity lookups.
    pub fn resolver(&self) -> &IdentityResolver {
        &self.resolver
    }

    /// Activity tracker.
    pub fn activity(&self) -> &ActivityTracker {
        &self.activity
    }

    /// Subscribe to session events.
    pub fn subscribe_events(&self) -> broadcast::Receiver<DomainEvent> {
        self.events.subscribe()
    }

    /// An MFA flow bound to this manager's backend and site-login policy.
    pub fn mfa_flow(&self) -> MfaChallengeFlow {
        MfaChallengeFlow::new(
            Arc::clone(&self.backend),
            self.resolver.clone(),
            self.state.require_site_login().subscribe(),
        )
    }

    /// Force `loading` off.
    pub fn clear_loading(&self) {
        self.state.set_loading(false);
    }

    // ── Auth notifications ─────────────────────────────────────

    /// Apply a backend auth notification.
    pub async fn handle_auth_event(&self, event: AuthEvent) {
        match event {
            AuthEvent::SignedIn(user) => self.on_signed_in(user).await,
            AuthEvent::TokenRefreshed(user) => {
                let same_user = self
                    .state
                    .user()
                    .get()
                    .is_some_and(|current| current.id == user.id);
                if same_user {
                    self.state.set_user(Some(user));
                } else {
                    self.on_signed_in(user).await;
                }
            }
            AuthEvent::SignedOut => self.on_signed_out(),
        }
    }

    async fn on_signed_in(&self, user: AuthUser) {
        info!(user_id = %user.id, email = %user.email_or_empty(), "User signed in");

        match self.persisted.load_session_start().await {
            Some(start) => self.state.set_session_start(Some(start)),
            None => self.start_session_clock().await,
        }

        self.state.set_user(Some(user.clone()));
        self.activity.record();
        let resolution = self.resolve_for(&user).await;
        self.state.set_admin_session_expired(false);

        self.emit(
            Some(&user),
            SessionEvent::SignedIn {
                is_admin: resolution.is_admin,
            },
        );
    }

    fn on_signed_out(&self) {
        info!("User signed out");
        self.state.clear_identity();
    }

    /// Resolve and apply identity for `user` if still current.
    async fn resolve_for(&self, user: &AuthUser) -> IdentityResolution {
        let resolution = self.resolver.resolve(user.email_or_empty()).await;
        if !self.state.apply_identity(&user.id, resolution) {
            debug!(user_id = %user.id, "User changed during resolution; result dropped");
        }
        resolution
    }

    async fn start_session_clock(&self) {
        let now = self.clock.now();
        self.persisted.save_session_start(now).await;
        self.state.set_session_start(Some(now));
    }

    // ── Page events ────────────────────────────────────────────

    /// Dispatch a page event from the embedding platform.
    pub async fn handle_page_event(&self, event: PageEvent) {
        match event {
            PageEvent::Focus => self.on_focus_regained().await,
            PageEvent::VisibilityChanged { hidden } => self.on_visibility_changed(hidden).await,
            PageEvent::Activity { .. } => self.record_activity(),
            PageEvent::Navigation { path } => {
                self.check_blocked_status_in_background(Some(&path)).await
            }
        }
    }

    /// Note user activity now.
    pub fn record_activity(&self) {
        self.activity.record();
    }

    /// The window regained focus.
    pub async fn on_focus_regained(&self) {
        self.revalidator.revalidate(&self.state).await;
    }

    /// The page became hidden or visible.
    pub async fn on_visibility_changed(&self, hidden: bool) {
        self.revalidator
            .on_visibility_changed(&self.state, hidden)
            .await;
    }

    // ── Enforcement ────────────────────────────────────────────

    /// End the admin session if a timeout limit is exceeded.
    ///
    /// Non-admin sessions are never timed out.
    pub async fn check_timeouts(&self) -> Option<ExpiryReason> {
        if !self.state.is_admin().get() {
            return None;
        }

        let reason = supervisor::check_expiry(
            &self.settings.current(),
            self.clock.now(),
            self.activity.last_activity(),
            self.state.session_start(),
        )?;

        let user = self.state.user().get();
        warn!(
            user_id = user.as_ref().map(|u| u.id.as_str()).unwrap_or(""),
            reason = %reason,
            "Admin session expired"
        );

        self.state.set_admin_session_expired(true);
        self.emit(user.as_ref(), SessionEvent::Expired { reason });

        // Failures are already logged by logout.
        let _ = self.logout().await;
        Some(reason)
    }

    /// Throttled check that the signed-in account has not been blocked.
    ///
    /// A confirmed block signs the user out and redirects to the login
    /// route with `blocked=true` and, when given, the return path. Lookup
    /// failures never log anyone out.
    pub async fn check_blocked_status_in_background(&self, return_path: Option<&str>) {
        let user = self.state.user().get();
        let email = user
            .as_ref()
            .map(|u| u.email_or_empty().to_string())
            .unwrap_or_default();

        if self.blocked.check(&email).await != BlockedCheck::Blocked {
            return;
        }

        warn!(email = %email, "Signed-in account is blocked; ending session");

        if let Err(e) = self.backend.sign_out().await {
            warn!(error = %e, "Sign-out failed for blocked account");
        }

        self.end_local_session().await;
        self.emit(user.as_ref(), SessionEvent::Blocked);

        let redirect = Redirect::to(&self.config.login_route)
            .with_return_url(return_path)
            .blocked();
        self.navigator.navigate(&redirect);
    }

    /// Send one heartbeat if an admin session is active.
    pub async fn send_heartbeat(&self) {
        if !self.state.is_admin().get() {
            return;
        }
        match self.backend.heartbeat().await {
            Ok(()) => debug!("Heartbeat sent"),
            Err(e) => warn!(error = %e, "Heartbeat failed"),
        }
    }

    // ── Logout ─────────────────────────────────────────────────

    /// Sign out and redirect to the login route.
    ///
    /// If the backend sign-out fails, nothing local changes and no
    /// navigation happens.
    pub async fn logout(&self) -> AppResult<()> {
        let user = self.state.user().get();

        if let Err(e) = self.backend.sign_out().await {
            error!(error = %e, "Logout failed");
            return Err(e);
        }

        self.end_local_session().await;
        self.emit(user.as_ref(), SessionEvent::LoggedOut);
        self.navigator
            .navigate(&Redirect::to(&self.config.login_route));

        info!(
            user_id = user.as_ref().map(|u| u.id.as_str()).unwrap_or(""),
            "Logged out"
        );
        Ok(())
    }

    async fn end_local_session(&self) {
        self.state.clear_identity();
        self.persisted.clear_session_start().await;
        self.state.set_session_start(None);
    }

    fn emit(&self, user: Option<&AuthUser>, payload: SessionEvent) {
        let event = DomainEvent::new(self.clock.now(), user.map(|u| u.id.clone()), payload);
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}
