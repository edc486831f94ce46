use chrono::{Duration, Utc};
use uuid::Uuid;

use homeswap_api::domain::types::{ActiveSession, UNKNOWN_IP};
use homeswap_api::error::ApiError;
use homeswap_api::usecase::session::{
    LoginInput, LoginUseCase, LogoutUseCase, ResetSessionsInput, ResetSessionsUseCase,
};
use homeswap_api::usecase::sweeper::{PendingUserSweeper, SessionSweeper};
use homeswap_auth_types::token::validate_access_token;

use crate::helpers::{MemoryStore, TEST_PASSWORD, TEST_SECRET, test_user, token_issuer};

fn login_usecase(store: &MemoryStore) -> LoginUseCase<MemoryStore, MemoryStore> {
    LoginUseCase {
        users: store.clone(),
        sessions: store.clone(),
        tokens: token_issuer(),
    }
}

fn login_input(email: &str) -> LoginInput {
    LoginInput {
        email: email.to_owned(),
        password: TEST_PASSWORD.to_owned(),
        ip_address: "10.0.0.1".to_owned(),
    }
}

// ── Login ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_open_session_and_embed_its_token() {
    let user = test_user("a@x.com");
    let store = MemoryStore::with_users(vec![user.clone()]);

    let out = login_usecase(&store)
        .execute(login_input("a@x.com"))
        .await
        .unwrap();

    assert_eq!(out.user.id, user.id);
    assert_eq!(out.session.ip_address, "10.0.0.1");
    assert_eq!(store.session_count(user.id), 1);

    let info = validate_access_token(&out.access_token, TEST_SECRET).unwrap();
    assert_eq!(info.user_id, user.id);
    assert_eq!(info.session_token, out.session.session_token);
    assert_eq!(info.exp, out.access_token_exp);
}

#[tokio::test]
async fn should_reject_unknown_email_and_wrong_password_alike() {
    let store = MemoryStore::with_users(vec![test_user("a@x.com")]);
    let usecase = login_usecase(&store);

    let unknown = usecase.execute(login_input("nobody@x.com")).await;
    assert!(
        matches!(unknown, Err(ApiError::InvalidCredentials)),
        "expected InvalidCredentials, got {unknown:?}"
    );

    let wrong = usecase
        .execute(LoginInput {
            password: "not-the-password".to_owned(),
            ..login_input("a@x.com")
        })
        .await;
    assert!(
        matches!(wrong, Err(ApiError::InvalidCredentials)),
        "expected InvalidCredentials, got {wrong:?}"
    );
}

#[tokio::test]
async fn should_suspend_on_fourth_login_and_keep_three_sessions() {
    let user = test_user("a@x.com");
    let store = MemoryStore::with_users(vec![user.clone()]);
    let usecase = login_usecase(&store);

    for _ in 0..3 {
        usecase.execute(login_input("a@x.com")).await.unwrap();
    }
    let fourth = usecase.execute(login_input("a@x.com")).await;

    match fourth {
        Err(ApiError::AccountSuspended(reason)) => {
            assert_eq!(reason, "Exceeded concurrent device limit (3).");
        }
        other => panic!("expected AccountSuspended, got {other:?}"),
    }
    assert_eq!(store.session_count(user.id), 3);
    let stored = store.user(user.id);
    assert!(stored.is_suspended);
    assert_eq!(
        stored.suspension_reason.as_deref(),
        Some("Exceeded concurrent device limit (3).")
    );
}

#[tokio::test]
async fn should_reject_suspended_user_before_opening_a_session() {
    let mut user = test_user("a@x.com");
    user.is_suspended = true;
    user.suspension_reason = Some("manual review".to_owned());
    let store = MemoryStore::with_users(vec![user.clone()]);

    let result = login_usecase(&store).execute(login_input("a@x.com")).await;

    match result {
        Err(ApiError::AccountSuspended(reason)) => assert_eq!(reason, "manual review"),
        other => panic!("expected AccountSuspended, got {other:?}"),
    }
    assert_eq!(store.session_count(user.id), 0);
}

#[tokio::test]
async fn should_report_suspension_even_with_wrong_password() {
    let mut user = test_user("a@x.com");
    user.is_suspended = true;
    user.suspension_reason = Some("manual review".to_owned());
    let store = MemoryStore::with_users(vec![user.clone()]);

    let result = login_usecase(&store)
        .execute(LoginInput {
            password: "wrong-password".to_owned(),
            ..login_input("a@x.com")
        })
        .await;

    match result {
        Err(ApiError::AccountSuspended(reason)) => assert_eq!(reason, "manual review"),
        other => panic!("expected AccountSuspended, got {other:?}"),
    }
    assert_eq!(store.session_count(user.id), 0);
}

#[tokio::test]
async fn should_never_exceed_session_cap_under_concurrent_logins() {
    let user = test_user("a@x.com");
    let store = MemoryStore::with_users(vec![user.clone()]);
    let usecase = login_usecase(&store);

    let results = tokio::join!(
        usecase.execute(login_input("a@x.com")),
        usecase.execute(login_input("a@x.com")),
        usecase.execute(login_input("a@x.com")),
        usecase.execute(login_input("a@x.com")),
        usecase.execute(login_input("a@x.com")),
    );
    let results = [results.0, results.1, results.2, results.3, results.4];

    let admitted = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(admitted, 3);
    assert!(
        results
            .iter()
            .filter(|r| r.is_err())
            .all(|r| matches!(r, Err(ApiError::AccountSuspended(_))))
    );
    assert_eq!(store.session_count(user.id), 3);
    assert!(store.user(user.id).is_suspended);
}

// ── Logout ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_delete_only_the_current_session_on_logout() {
    let user = test_user("a@x.com");
    let store = MemoryStore::with_users(vec![user.clone()]);
    let login = login_usecase(&store);
    let first = login.execute(login_input("a@x.com")).await.unwrap();
    login.execute(login_input("a@x.com")).await.unwrap();

    let logout = LogoutUseCase {
        sessions: store.clone(),
    };
    logout
        .execute(user.id, &first.session.session_token)
        .await
        .unwrap();

    assert_eq!(store.session_count(user.id), 1);
}

#[tokio::test]
async fn should_treat_repeated_logout_as_success() {
    let user = test_user("a@x.com");
    let store = MemoryStore::with_users(vec![user.clone()]);
    let out = login_usecase(&store)
        .execute(login_input("a@x.com"))
        .await
        .unwrap();

    let logout = LogoutUseCase {
        sessions: store.clone(),
    };
    logout
        .execute(user.id, &out.session.session_token)
        .await
        .unwrap();
    logout
        .execute(user.id, &out.session.session_token)
        .await
        .unwrap();

    assert_eq!(store.session_count(user.id), 0);
}

// ── Reset sessions and suspension ────────────────────────────────────────────

#[tokio::test]
async fn should_recover_from_device_lockout_and_log_in_again() {
    let user = test_user("a@x.com");
    let store = MemoryStore::with_users(vec![user.clone()]);
    let login = login_usecase(&store);
    for _ in 0..3 {
        login.execute(login_input("a@x.com")).await.unwrap();
    }
    assert!(login.execute(login_input("a@x.com")).await.is_err());

    let reset = ResetSessionsUseCase {
        users: store.clone(),
        sessions: store.clone(),
    };
    let rows = reset
        .execute(ResetSessionsInput {
            email: "a@x.com".to_owned(),
            password: TEST_PASSWORD.to_owned(),
        })
        .await
        .unwrap();

    assert_eq!(rows, 3);
    assert_eq!(store.session_count(user.id), 0);
    let stored = store.user(user.id);
    assert!(!stored.is_suspended);
    assert!(stored.suspension_reason.is_none());

    login.execute(login_input("a@x.com")).await.unwrap();
    assert_eq!(store.session_count(user.id), 1);
}

#[tokio::test]
async fn should_deny_recovery_with_wrong_password() {
    let mut user = test_user("a@x.com");
    user.is_suspended = true;
    let store = MemoryStore::with_users(vec![user.clone()]);

    let reset = ResetSessionsUseCase {
        users: store.clone(),
        sessions: store.clone(),
    };
    let result = reset
        .execute(ResetSessionsInput {
            email: "a@x.com".to_owned(),
            password: "wrong-password".to_owned(),
        })
        .await;

    assert!(
        matches!(result, Err(ApiError::RecoveryDenied)),
        "expected RecoveryDenied, got {result:?}"
    );
    assert!(store.user(user.id).is_suspended);
}

// ── Sweepers ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_sweep_sessions_idle_for_more_than_seven_days() {
    let user = test_user("a@x.com");
    let store = MemoryStore::with_users(vec![user.clone()]);
    let now = Utc::now();
    let session = |idle_days: i64| ActiveSession {
        id: Uuid::now_v7(),
        user_id: user.id,
        session_token: Uuid::new_v4().simple().to_string(),
        ip_address: UNKNOWN_IP.to_owned(),
        last_activity: now - Duration::days(idle_days),
        created_at: now - Duration::days(30),
    };
    store.state().sessions = vec![session(8), session(6), session(0)];

    let sweeper = SessionSweeper {
        sessions: store.clone(),
    };
    let rows = sweeper.run_once(now).await.unwrap();

    assert_eq!(rows, 1);
    assert_eq!(store.session_count(user.id), 2);
}

#[tokio::test]
async fn should_sweep_stale_pending_registrations_with_their_otps() {
    use homeswap_api::domain::types::{OtpVerification, PendingUser};
    use homeswap_domain::otp::OtpMethod;
    use homeswap_domain::user::UserRole;

    let store = MemoryStore::new();
    let now = Utc::now();
    let pending = |email: &str, age_hours: i64| PendingUser {
        id: Uuid::now_v7(),
        email: email.to_owned(),
        password_hash: String::new(),
        full_name: "P U".to_owned(),
        phone_number: None,
        referral_code: None,
        role: UserRole::User,
        created_at: now - Duration::hours(age_hours),
    };
    let stale = pending("old@x.com", 48);
    let fresh = pending("new@x.com", 1);
    {
        let mut state = store.state();
        state.otps.push(OtpVerification {
            id: Uuid::now_v7(),
            pending_user_id: stale.id,
            code: "1234".to_owned(),
            method: OtpMethod::Email,
            expires_at: now,
            verified_at: None,
            created_at: now - Duration::hours(48),
        });
        state.pending = vec![stale, fresh.clone()];
    }

    let sweeper = PendingUserSweeper {
        registrations: store.clone(),
        ttl: Duration::hours(24),
    };
    let rows = sweeper.run_once(now).await.unwrap();

    assert_eq!(rows, 1);
    let state = store.state();
    assert_eq!(state.pending.len(), 1);
    assert_eq!(state.pending[0].id, fresh.id);
    assert!(state.otps.is_empty());
}
