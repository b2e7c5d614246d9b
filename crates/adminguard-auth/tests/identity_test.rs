//! Integration tests for admin identity resolution.

mod helpers;

use std::sync::Arc;

use serde_json::json;

use adminguard_auth::identity::{IdentityResolution, IdentityResolver};
use adminguard_core::error::AppError;
use adminguard_core::traits::backend::functions;

use helpers::{ADMIN_EMAIL, FakeBackend, MEMBER_EMAIL};

fn resolver() -> (Arc<FakeBackend>, IdentityResolver) {
    let backend = Arc::new(FakeBackend::new());
    backend.put_account(ADMIN_EMAIL, true, false);
    backend.put_account(MEMBER_EMAIL, false, false);
    let resolver = IdentityResolver::new(backend.clone());
    (backend, resolver)
}

#[tokio::test]
async fn test_unknown_email_is_not_admin() {
    let (_, resolver) = resolver();
    assert!(!resolver.check_admin_status("stranger@example.com").await);
}

#[tokio::test]
async fn test_admin_record_is_admin() {
    let (_, resolver) = resolver();
    assert!(resolver.check_admin_status(ADMIN_EMAIL).await);
    assert!(!resolver.check_admin_status(MEMBER_EMAIL).await);
}

#[tokio::test]
async fn test_lookup_failure_is_not_admin() {
    let (backend, resolver) = resolver();
    backend.fail_lookups(true);
    assert!(!resolver.check_admin_status(ADMIN_EMAIL).await);
    assert_eq!(resolver.resolve(ADMIN_EMAIL).await, IdentityResolution::NONE);
}

#[tokio::test]
async fn test_empty_email_skips_lookup() {
    let (backend, resolver) = resolver();
    assert!(!resolver.check_admin_status("   ").await);
    assert_eq!(resolver.resolve("").await, IdentityResolution::NONE);
    assert_eq!(backend.count("find_account"), 0);
}

#[tokio::test]
async fn test_blocked_admin_keeps_admin_email_only() {
    let (backend, resolver) = resolver();
    backend.put_account(ADMIN_EMAIL, true, true);

    let resolution = resolver.resolve(ADMIN_EMAIL).await;

    assert!(!resolution.is_admin);
    assert!(resolution.has_admin_email);
    assert_eq!(resolver.is_blocked(ADMIN_EMAIL).await.unwrap(), Some(true));
    assert_eq!(resolver.is_blocked("nobody@example.com").await.unwrap(), None);
}

#[tokio::test]
async fn test_remote_admin_check() {
    let (backend, resolver) = resolver();

    assert!(resolver.is_email_admin(ADMIN_EMAIL).await);
    assert!(!resolver.is_email_admin(MEMBER_EMAIL).await);
    assert_eq!(
        backend.bodies(functions::CHECK_ADMIN_STATUS)[0],
        json!({ "email": ADMIN_EMAIL })
    );
}

#[tokio::test]
async fn test_remote_admin_check_fails_closed() {
    let (backend, resolver) = resolver();

    backend.script(
        functions::CHECK_ADMIN_STATUS,
        Ok(json!({ "error": "function crashed" })),
    );
    assert!(!resolver.is_email_admin(ADMIN_EMAIL).await);

    backend.script(functions::CHECK_ADMIN_STATUS, Ok(json!({ "admin": "yes" })));
    assert!(!resolver.is_email_admin(ADMIN_EMAIL).await);

    backend.script(
        functions::CHECK_ADMIN_STATUS,
        Err(AppError::external("Edge Function returned a non-2xx status code")),
    );
    assert!(!resolver.is_email_admin(ADMIN_EMAIL).await);
}
