//! Integration tests for inactivity and maximum-duration enforcement.

mod helpers;

use std::time::Duration;

use tokio::sync::watch;

use adminguard_auth::session::TimeoutSupervisor;
use adminguard_core::events::{ExpiryReason, SessionEvent};
use adminguard_core::types::redirect::Redirect;

use helpers::{START_MILLIS, TestHarness, at_millis, drain_events};

#[tokio::test]
async fn test_idle_admin_is_logged_out_after_inactivity_timeout() {
    let h = TestHarness::new();
    h.sign_in_admin().await;
    let mut events = h.manager.subscribe_events();

    h.clock.advance_minutes(31);
    let reason = h.manager.check_timeouts().await;

    assert_eq!(reason, Some(ExpiryReason::Inactivity));
    let snapshot = h.manager.snapshot();
    assert!(snapshot.admin_session_expired);
    assert!(snapshot.user.is_none());
    assert!(!snapshot.is_admin);
    assert_eq!(h.backend.count("sign_out"), 1);
    assert_eq!(h.navigator.redirects(), vec![Redirect::to("/login")]);
    assert_eq!(
        drain_events(&mut events),
        vec![
            SessionEvent::Expired {
                reason: ExpiryReason::Inactivity
            },
            SessionEvent::LoggedOut,
        ]
    );
}

#[tokio::test]
async fn test_recent_activity_keeps_admin_signed_in() {
    let h = TestHarness::new();
    h.sign_in_admin().await;

    h.clock.advance_minutes(29);
    h.manager.record_activity();
    h.clock.advance_minutes(2);

    assert_eq!(h.manager.check_timeouts().await, None);
    assert!(h.manager.state().is_admin().get());
    assert_eq!(h.navigator.count(), 0);
    assert_eq!(h.backend.count("sign_out"), 0);
}

#[tokio::test]
async fn test_exactly_at_limit_is_not_expired() {
    let h = TestHarness::new();
    h.sign_in_admin().await;

    h.clock.advance_minutes(30);

    assert_eq!(h.manager.check_timeouts().await, None);
}

#[tokio::test]
async fn test_non_admin_is_never_timed_out() {
    let h = TestHarness::new();
    h.sign_in_member().await;

    h.clock.advance_minutes(600);

    assert_eq!(h.manager.check_timeouts().await, None);
    assert!(h.manager.state().is_authenticated().get());
    assert_eq!(h.backend.count("sign_out"), 0);
}

#[tokio::test]
async fn test_max_duration_expires_active_admin() {
    let h = TestHarness::new();
    h.put_marker(at_millis(START_MILLIS - 470 * 60_000)).await;
    h.sign_in_admin().await;

    h.clock.advance_minutes(11);
    h.manager.record_activity();

    assert_eq!(
        h.manager.check_timeouts().await,
        Some(ExpiryReason::MaxDuration)
    );
    assert_eq!(h.stored_marker().await, None);
}

#[tokio::test]
async fn test_sign_in_clears_expired_flag() {
    let h = TestHarness::new();
    h.sign_in_admin().await;
    h.clock.advance_minutes(31);
    h.manager.check_timeouts().await;
    assert!(h.manager.state().admin_session_expired().get());

    h.sign_in_admin().await;

    assert!(!h.manager.state().admin_session_expired().get());
    assert_eq!(
        h.stored_marker().await,
        Some((START_MILLIS + 31 * 60_000).to_string())
    );
}

#[tokio::test]
async fn test_failed_logout_leaves_session_in_place() {
    let h = TestHarness::new();
    h.sign_in_admin().await;
    h.backend.fail_sign_out(true);

    h.clock.advance_minutes(31);
    assert_eq!(
        h.manager.check_timeouts().await,
        Some(ExpiryReason::Inactivity)
    );

    assert!(h.manager.state().admin_session_expired().get());
    assert!(h.manager.state().user().get().is_some());
    assert_eq!(h.navigator.count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_supervisor_loop_enforces_timeouts() {
    let h = TestHarness::new();
    h.sign_in_admin().await;
    h.clock.advance_minutes(31);

    let supervisor = TimeoutSupervisor::new(h.manager.clone(), 30);
    let (cancel_tx, cancel_rx) = watch::channel(false);
    let task = tokio::spawn(async move { supervisor.run(cancel_rx).await });

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(h.navigator.count(), 1);

    // Later ticks find no admin and do nothing more.
    tokio::time::sleep(Duration::from_secs(90)).await;
    assert_eq!(h.navigator.count(), 1);

    cancel_tx.send(true).unwrap();
    task.await.unwrap();
}
