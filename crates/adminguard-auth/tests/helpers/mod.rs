//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use tokio::sync::{Notify, broadcast};

use adminguard_auth::session::{AdminSessionManager, SessionDeps};
use adminguard_core::clock::ManualClock;
use adminguard_core::config::SessionConfig;
use adminguard_core::error::AppError;
use adminguard_core::events::{AuthEvent, DomainEvent, SessionEvent};
use adminguard_core::result::AppResult;
use adminguard_core::traits::backend::{Backend, functions};
use adminguard_core::traits::navigator::Navigator;
use adminguard_core::traits::store::KeyValueStore;
use adminguard_core::types::redirect::Redirect;
use adminguard_core::types::settings::SecuritySettingsRecord;
use adminguard_core::types::user::{AccountRecord, AuthUser};
use adminguard_store::keys;
use adminguard_store::memory::MemoryStore;

/// Fixed start instant for every test clock.
pub const START_MILLIS: i64 = 1_700_000_000_000;

pub const ADMIN_ID: &str = "user-admin";
pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const MEMBER_ID: &str = "user-member";
pub const MEMBER_EMAIL: &str = "member@example.com";

/// In-memory backend with scripted remote-function responses and a call log.
pub struct FakeBackend {
    accounts: Mutex<HashMap<String, AccountRecord>>,
    session: Mutex<Option<AuthUser>>,
    settings: Mutex<Option<SecuritySettingsRecord>>,
    scripted: Mutex<HashMap<String, VecDeque<AppResult<Value>>>>,
    calls: Mutex<Vec<String>>,
    invocations: Mutex<Vec<(String, Value)>>,
    saved_settings: Mutex<Vec<SecuritySettingsRecord>>,
    fail_lookups: AtomicBool,
    fail_sign_out: AtomicBool,
    fail_settings: AtomicBool,
    heartbeats: AtomicUsize,
    lookup_gate: Mutex<Option<Arc<Notify>>>,
    events: broadcast::Sender<AuthEvent>,
}

impl FakeBackend {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            accounts: Mutex::new(HashMap::new()),
            session: Mutex::new(None),
            settings: Mutex::new(None),
            scripted: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            invocations: Mutex::new(Vec::new()),
            saved_settings: Mutex::new(Vec::new()),
            fail_lookups: AtomicBool::new(false),
            fail_sign_out: AtomicBool::new(false),
            fail_settings: AtomicBool::new(false),
            heartbeats: AtomicUsize::new(0),
            lookup_gate: Mutex::new(None),
            events,
        }
    }

    /// Insert or replace an account row.
    pub fn put_account(&self, email: &str, is_admin: bool, is_blocked: bool) {
        self.accounts.lock().unwrap().insert(
            email.to_string(),
            AccountRecord {
                email: email.to_string(),
                is_admin,
                is_blocked,
            },
        );
    }

    pub fn set_session(&self, user: Option<AuthUser>) {
        *self.session.lock().unwrap() = user;
    }

    pub fn set_settings(&self, record: Option<SecuritySettingsRecord>) {
        *self.settings.lock().unwrap() = record;
    }

    /// Queue a response for the next invocation of `function`.
    pub fn script(&self, function: &str, response: AppResult<Value>) {
        self.scripted
            .lock()
            .unwrap()
            .entry(function.to_string())
            .or_default()
            .push_back(response);
    }

    pub fn fail_lookups(&self, fail: bool) {
        self.fail_lookups.store(fail, Ordering::SeqCst);
    }

    pub fn fail_sign_out(&self, fail: bool) {
        self.fail_sign_out.store(fail, Ordering::SeqCst);
    }

    pub fn fail_settings(&self, fail: bool) {
        self.fail_settings.store(fail, Ordering::SeqCst);
    }

    /// Hold the next account lookup until the returned handle is notified.
    pub fn gate_next_lookup(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.lookup_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    /// Publish an auth notification to subscribers.
    pub fn publish(&self, event: AuthEvent) {
        let _ = self.events.send(event);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of logged calls starting with `prefix`.
    pub fn count(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    /// Bodies sent to `function`, in order.
    pub fn bodies(&self, function: &str) -> Vec<Value> {
        self.invocations
            .lock()
            .unwrap()
            .iter()
            .filter(|(name, _)| name == function)
            .map(|(_, body)| body.clone())
            .collect()
    }

    pub fn saved_settings(&self) -> Vec<SecuritySettingsRecord> {
        self.saved_settings.lock().unwrap().clone()
    }

    pub fn heartbeats(&self) -> usize {
        self.heartbeats.load(Ordering::SeqCst)
    }

    fn log(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn default_response(&self, function: &str, body: &Value) -> AppResult<Value> {
        match function {
            functions::CHECK_ADMIN_STATUS => {
                let email = body["email"].as_str().unwrap_or_default();
                let is_admin = self
                    .accounts
                    .lock()
                    .unwrap()
                    .get(email)
                    .is_some_and(|r| r.is_admin);
                Ok(json!({ "is_admin": is_admin }))
            }
            functions::SEND_VERIFICATION_CODE => Ok(json!({
                "codeId": "code-1",
                "expiresAt": "2023-11-14T22:23:20Z",
            })),
            functions::VERIFY_CODE => Ok(json!({ "success": true })),
            other => Err(AppError::external(format!("unknown function {other}"))),
        }
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn current_session(&self) -> AppResult<Option<AuthUser>> {
        self.log("current_session".to_string());
        Ok(self.session.lock().unwrap().clone())
    }

    async fn sign_out(&self) -> AppResult<()> {
        self.log("sign_out".to_string());
        if self.fail_sign_out.load(Ordering::SeqCst) {
            return Err(AppError::external("sign-out request failed"));
        }
        *self.session.lock().unwrap() = None;
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    async fn find_account(&self, email: &str) -> AppResult<Option<AccountRecord>> {
        self.log(format!("find_account:{email}"));
        let gate = self.lookup_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(AppError::external("account lookup failed"));
        }
        Ok(self.accounts.lock().unwrap().get(email).cloned())
    }

    async fn fetch_security_settings(&self) -> AppResult<Option<SecuritySettingsRecord>> {
        self.log("fetch_security_settings".to_string());
        if self.fail_settings.load(Ordering::SeqCst) {
            return Err(AppError::external("settings unavailable"));
        }
        Ok(self.settings.lock().unwrap().clone())
    }

    async fn save_security_settings(&self, record: &SecuritySettingsRecord) -> AppResult<()> {
        self.log("save_security_settings".to_string());
        if self.fail_settings.load(Ordering::SeqCst) {
            return Err(AppError::external("settings unavailable"));
        }
        self.saved_settings.lock().unwrap().push(record.clone());
        *self.settings.lock().unwrap() = Some(record.clone());
        Ok(())
    }

    async fn invoke(&self, function: &str, body: Value) -> AppResult<Value> {
        self.log(format!("invoke:{function}"));
        self.invocations
            .lock()
            .unwrap()
            .push((function.to_string(), body.clone()));

        let scripted = self
            .scripted
            .lock()
            .unwrap()
            .get_mut(function)
            .and_then(VecDeque::pop_front);
        match scripted {
            Some(response) => response,
            None => self.default_response(function, &body),
        }
    }

    async fn heartbeat(&self) -> AppResult<()> {
        self.heartbeats.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Navigator that records every redirect.
#[derive(Default)]
pub struct RecordingNavigator {
    redirects: Mutex<Vec<Redirect>>,
}

impl RecordingNavigator {
    pub fn redirects(&self) -> Vec<Redirect> {
        self.redirects.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.redirects.lock().unwrap().len()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, redirect: &Redirect) {
        self.redirects.lock().unwrap().push(redirect.clone());
    }
}

/// A manager wired to fakes, plus handles on each fake.
pub struct TestHarness {
    pub backend: Arc<FakeBackend>,
    pub navigator: Arc<RecordingNavigator>,
    pub clock: Arc<ManualClock>,
    pub store: Arc<MemoryStore>,
    pub manager: Arc<AdminSessionManager>,
}

impl TestHarness {
    /// Harness with one admin and one regular member account.
    pub fn new() -> Self {
        let backend = Arc::new(FakeBackend::new());
        backend.put_account(ADMIN_EMAIL, true, false);
        backend.put_account(MEMBER_EMAIL, false, false);
        Self::with_backend(backend, Arc::new(MemoryStore::default()))
    }

    pub fn with_backend(backend: Arc<FakeBackend>, store: Arc<MemoryStore>) -> Self {
        let navigator = Arc::new(RecordingNavigator::default());
        let clock = Arc::new(ManualClock::from_millis(START_MILLIS));

        let deps = SessionDeps::new(
            backend.clone(),
            store.clone(),
            navigator.clone(),
            SessionConfig::default(),
        )
        .with_clock(clock.clone());

        Self {
            manager: AdminSessionManager::new(deps),
            backend,
            navigator,
            clock,
            store,
        }
    }

    /// Sign the admin in through the auth notification path.
    pub async fn sign_in_admin(&self) {
        self.manager
            .handle_auth_event(AuthEvent::SignedIn(admin_user()))
            .await;
    }

    /// Sign the member in through the auth notification path.
    pub async fn sign_in_member(&self) {
        self.manager
            .handle_auth_event(AuthEvent::SignedIn(member_user()))
            .await;
    }

    /// Persisted session-start marker, raw.
    pub async fn stored_marker(&self) -> Option<String> {
        self.store.get(&keys::session_start()).await.unwrap()
    }

    /// Write a session-start marker directly into the store.
    pub async fn put_marker(&self, start: DateTime<Utc>) {
        self.store
            .set(&keys::session_start(), &start.timestamp_millis().to_string())
            .await
            .unwrap();
    }
}

pub fn admin_user() -> AuthUser {
    AuthUser::new(ADMIN_ID, Some(ADMIN_EMAIL.to_string()))
}

pub fn member_user() -> AuthUser {
    AuthUser::new(MEMBER_ID, Some(MEMBER_EMAIL.to_string()))
}

pub fn at_millis(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap()
}

/// Drain every event currently buffered on `rx`.
pub fn drain_events(rx: &mut broadcast::Receiver<DomainEvent>) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event.payload);
    }
    events
}
