use std::sync::Arc;

use chrono::{Duration, Utc};
use scholaris_shared::types::{SchoolId, UserId};

use super::*;
use crate::memory::MemoryStore;
use crate::provisioning::{NewPrincipal, NewSchool, ProvisioningStore};

const PASSWORD: &str = "correct-horse-battery";

fn authority(store: &Arc<MemoryStore>) -> SessionAuthority {
    SessionAuthority::new(store.clone(), store.clone(), store.clone(), SessionPolicy::default())
}

fn new_principal(email: &str, role: Role, school_id: Option<SchoolId>) -> NewPrincipal {
    NewPrincipal {
        id: UserId::new(),
        email: email.to_string(),
        password_hash: hash_password(PASSWORD).unwrap(),
        full_name: "Test User".to_string(),
        role,
        school_id,
    }
}

async fn school_with_admin(store: &MemoryStore) -> (SchoolId, Principal) {
    let school_id = SchoolId::new();
    let (school, admin) = store
        .register_school(
            NewSchool {
                id: school_id,
                name: "Green Valley".into(),
                email: "office@greenvalley.test".into(),
            },
            new_principal("admin@greenvalley.test", Role::SchoolAdmin, Some(school_id)),
        )
        .await
        .unwrap();
    (school.id, admin)
}

fn client() -> ClientInfo {
    ClientInfo {
        ip_address: Some("10.0.0.7".into()),
        user_agent: Some("tests".into()),
    }
}

#[tokio::test]
async fn test_login_opens_session_and_audits() {
    let store = MemoryStore::new();
    let (school_id, admin) = school_with_admin(&store).await;
    let authority = authority(&store);

    let (token, session) = authority
        .authenticate("admin@greenvalley.test", PASSWORD, &client())
        .await
        .unwrap();

    assert_eq!(session.user_id, admin.id);
    assert_eq!(session.role, Role::SchoolAdmin);
    assert_eq!(session.school_id, Some(school_id));
    assert_eq!(session.token_hash, token.digest());
    assert_eq!(session.expires_at - session.created_at, Duration::hours(24));
    assert_eq!(store.session_count().await, 1);

    let events = store.auth_events().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, AuthEventKind::LoginSucceeded);
    assert_eq!(events[0].user_id, Some(admin.id));
    assert_eq!(events[0].ip_address.as_deref(), Some("10.0.0.7"));
}

#[tokio::test]
async fn test_login_email_is_case_insensitive() {
    let store = MemoryStore::new();
    school_with_admin(&store).await;

    let result = authority(&store)
        .authenticate("  Admin@GreenValley.TEST ", PASSWORD, &client())
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_wrong_password_and_unknown_email_are_indistinguishable() {
    let store = MemoryStore::new();
    school_with_admin(&store).await;
    let authority = authority(&store);

    let wrong_password = authority
        .authenticate("admin@greenvalley.test", "not-the-password", &client())
        .await
        .unwrap_err();
    let unknown_email = authority
        .authenticate("nobody@greenvalley.test", PASSWORD, &client())
        .await
        .unwrap_err();

    assert!(matches!(wrong_password, AuthenticationError::InvalidCredentials));
    assert!(matches!(unknown_email, AuthenticationError::InvalidCredentials));
    assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    assert_eq!(wrong_password.error_code(), unknown_email.error_code());
    assert_eq!(store.session_count().await, 0);

    let events = store.auth_events().await;
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|e| e.kind == AuthEventKind::LoginFailed));
    assert!(events[1].user_id.is_none());
}

#[tokio::test]
async fn test_suspension_disclosed_only_with_correct_password() {
    let store = MemoryStore::new();
    let (_, admin) = school_with_admin(&store).await;
    store.set_principal_active(admin.id, false).await.unwrap();
    let authority = authority(&store);

    let wrong = authority
        .authenticate("admin@greenvalley.test", "not-the-password", &client())
        .await
        .unwrap_err();
    assert!(matches!(wrong, AuthenticationError::InvalidCredentials));

    let right = authority
        .authenticate("admin@greenvalley.test", PASSWORD, &client())
        .await
        .unwrap_err();
    assert!(matches!(right, AuthenticationError::AccountSuspended));
    assert_eq!(store.session_count().await, 0);
    assert_eq!(
        store.auth_events().await.last().map(|e| e.kind),
        Some(AuthEventKind::LoginSuspended)
    );
}

#[tokio::test]
async fn test_inactive_school_suspends_its_principals() {
    let store = MemoryStore::new();
    let (school_id, _) = school_with_admin(&store).await;
    store.set_school_active(school_id, false).await;

    let err = authority(&store)
        .authenticate("admin@greenvalley.test", PASSWORD, &client())
        .await
        .unwrap_err();
    assert!(matches!(err, AuthenticationError::AccountSuspended));
}

#[tokio::test]
async fn test_audit_failure_aborts_login() {
    let store = MemoryStore::new();
    school_with_admin(&store).await;
    store.set_audit_down(true);

    let err = authority(&store)
        .authenticate("admin@greenvalley.test", PASSWORD, &client())
        .await
        .unwrap_err();
    assert!(matches!(err, AuthenticationError::Backend(_)));
    assert_eq!(store.session_count().await, 0);
}

#[tokio::test]
async fn test_resolve_slides_idle_window_until_absolute_expiry() {
    let store = MemoryStore::new();
    school_with_admin(&store).await;
    let authority = authority(&store);
    let start = Utc::now();

    let (token, _) = authority
        .authenticate_at("admin@greenvalley.test", PASSWORD, &client(), start)
        .await
        .unwrap();

    // Each resolve lands inside the 30 minute idle window of the previous one.
    let mut at = start;
    while at + Duration::minutes(25) < start + Duration::hours(24) {
        at += Duration::minutes(25);
        let session = authority.resolve_at(&token, at).await.unwrap();
        assert_eq!(session.last_seen_at, at);
    }

    let err = authority
        .resolve_at(&token, start + Duration::hours(24))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthorizationError::Unauthenticated));
    assert_eq!(store.session_count().await, 0);
}

#[tokio::test]
async fn test_idle_session_is_removed_on_resolve() {
    let store = MemoryStore::new();
    school_with_admin(&store).await;
    let authority = authority(&store);
    let start = Utc::now();

    let (token, _) = authority
        .authenticate_at("admin@greenvalley.test", PASSWORD, &client(), start)
        .await
        .unwrap();

    let err = authority
        .resolve_at(&token, start + Duration::minutes(31))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthorizationError::Unauthenticated));
    assert_eq!(store.session_count().await, 0);
}

#[tokio::test]
async fn test_unknown_token_is_unauthenticated() {
    let store = MemoryStore::new();
    let err = authority(&store)
        .resolve(&SessionToken::generate())
        .await
        .unwrap_err();
    assert!(matches!(err, AuthorizationError::Unauthenticated));
}

#[tokio::test]
async fn test_check_access_enforces_role_and_school() {
    let store = MemoryStore::new();
    let (school_id, _) = school_with_admin(&store).await;
    let authority = authority(&store);
    let (token, _) = authority
        .authenticate("admin@greenvalley.test", PASSWORD, &client())
        .await
        .unwrap();

    assert!(authority
        .check_access(&token, Role::SchoolAdmin, Some(school_id))
        .await
        .is_ok());
    assert!(matches!(
        authority
            .check_access(&token, Role::SchoolAdmin, Some(SchoolId::new()))
            .await,
        Err(AuthorizationError::Forbidden(_))
    ));
    assert!(matches!(
        authority.check_access(&token, Role::SuperAdmin, None).await,
        Err(AuthorizationError::Forbidden(_))
    ));
}

#[tokio::test]
async fn test_terminate_is_idempotent() {
    let store = MemoryStore::new();
    school_with_admin(&store).await;
    let authority = authority(&store);
    let (token, _) = authority
        .authenticate("admin@greenvalley.test", PASSWORD, &client())
        .await
        .unwrap();

    authority.terminate(&token, &client()).await.unwrap();
    assert!(matches!(
        authority.check_access(&token, Role::SchoolAdmin, None).await,
        Err(AuthorizationError::Unauthenticated)
    ));

    authority.terminate(&token, &client()).await.unwrap();
    let logouts = store
        .auth_events()
        .await
        .into_iter()
        .filter(|e| e.kind == AuthEventKind::Logout)
        .count();
    assert_eq!(logouts, 1);
}

#[tokio::test]
async fn test_revoke_user_sessions() {
    let store = MemoryStore::new();
    let (_, admin) = school_with_admin(&store).await;
    store
        .seed_principal(new_principal("root@scholaris.test", Role::SuperAdmin, None))
        .await
        .unwrap();
    let authority = authority(&store);

    let (first, _) = authority
        .authenticate("admin@greenvalley.test", PASSWORD, &client())
        .await
        .unwrap();
    let (second, _) = authority
        .authenticate("admin@greenvalley.test", PASSWORD, &client())
        .await
        .unwrap();
    let (other, _) = authority
        .authenticate("root@scholaris.test", PASSWORD, &client())
        .await
        .unwrap();

    assert_eq!(authority.revoke_user_sessions(admin.id).await.unwrap(), 2);
    assert!(authority.resolve(&first).await.is_err());
    assert!(authority.resolve(&second).await.is_err());
    assert!(authority.resolve(&other).await.is_ok());
}

#[tokio::test]
async fn test_oversized_email_is_rejected_as_invalid_credentials() {
    let store = MemoryStore::new();
    school_with_admin(&store).await;
    let long_email = format!("{}@greenvalley.test", "a".repeat(300));
    let client = ClientInfo {
        ip_address: Some("9".repeat(80)),
        user_agent: Some("tests".into()),
    };

    let err = authority(&store)
        .authenticate(&long_email, PASSWORD, &client)
        .await
        .unwrap_err();

    assert!(matches!(err, AuthenticationError::InvalidCredentials));
    let events = store.auth_events().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, AuthEventKind::LoginFailed);
    assert_eq!(events[0].email.chars().count(), MAX_EMAIL_LENGTH);
    assert!(long_email.starts_with(&events[0].email));
    assert_eq!(
        events[0].ip_address.as_ref().map(|ip| ip.len()),
        Some(MAX_IP_LENGTH)
    );
}

#[tokio::test]
async fn test_resolve_rejects_session_once_school_is_suspended() {
    let store = MemoryStore::new();
    let (school_id, _) = school_with_admin(&store).await;
    let authority = authority(&store);
    let (token, _) = authority
        .authenticate("admin@greenvalley.test", PASSWORD, &client())
        .await
        .unwrap();

    store.set_school_active(school_id, false).await;

    let err = authority.resolve(&token).await.unwrap_err();
    assert!(matches!(err, AuthorizationError::Unauthenticated));
    assert_eq!(store.session_count().await, 0);

    // Reactivation does not bring the session back.
    store.set_school_active(school_id, true).await;
    assert!(authority.resolve(&token).await.is_err());
}

#[tokio::test]
async fn test_deactivating_principal_drops_its_sessions_atomically() {
    let store = MemoryStore::new();
    let (_, admin) = school_with_admin(&store).await;
    let authority = authority(&store);
    let (token, _) = authority
        .authenticate("admin@greenvalley.test", PASSWORD, &client())
        .await
        .unwrap();

    assert_eq!(
        store.set_principal_active(admin.id, false).await.unwrap(),
        Some(1)
    );
    assert_eq!(store.session_count().await, 0);
    assert!(matches!(
        authority.resolve(&token).await,
        Err(AuthorizationError::Unauthenticated)
    ));
    assert_eq!(
        store.set_principal_active(UserId::new(), false).await.unwrap(),
        None
    );
}
