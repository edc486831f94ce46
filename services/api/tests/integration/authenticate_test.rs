use chrono::{Duration, Utc};

use homeswap_api::error::ApiError;
use homeswap_api::usecase::account::DeleteUserUseCase;
use homeswap_api::usecase::authenticate::AuthenticateUseCase;
use homeswap_api::usecase::session::{
    LoginInput, LoginOutput, LoginUseCase, LogoutUseCase, ResetSessionsInput,
    ResetSessionsUseCase,
};

use crate::helpers::{MemoryStore, TEST_PASSWORD, TEST_SECRET, test_admin, test_user, token_issuer};

fn authenticate(store: &MemoryStore) -> AuthenticateUseCase<MemoryStore, MemoryStore> {
    AuthenticateUseCase {
        users: store.clone(),
        sessions: store.clone(),
        jwt_secret: TEST_SECRET.to_owned(),
    }
}

async fn login(store: &MemoryStore, email: &str) -> LoginOutput {
    LoginUseCase {
        users: store.clone(),
        sessions: store.clone(),
        tokens: token_issuer(),
    }
    .execute(LoginInput {
        email: email.to_owned(),
        password: TEST_PASSWORD.to_owned(),
        ip_address: "10.0.0.1".to_owned(),
    })
    .await
    .unwrap()
}

#[tokio::test]
async fn should_authenticate_live_session_and_touch_it() {
    let user = test_user("a@x.com");
    let store = MemoryStore::with_users(vec![user.clone()]);
    let out = login(&store, "a@x.com").await;

    let stale = Utc::now() - Duration::days(3);
    store.state().sessions[0].last_activity = stale;

    let ctx = authenticate(&store)
        .execute(&out.access_token)
        .await
        .unwrap();

    assert_eq!(ctx.user.id, user.id);
    assert_eq!(ctx.session_id, out.session.id);
    assert_eq!(ctx.session_token, out.session.session_token);
    assert!(store.state().sessions[0].last_activity > stale);
}

#[tokio::test]
async fn should_reject_token_whose_session_was_logged_out() {
    let user = test_user("a@x.com");
    let store = MemoryStore::with_users(vec![user.clone()]);
    let out = login(&store, "a@x.com").await;

    LogoutUseCase {
        sessions: store.clone(),
    }
    .execute(user.id, &out.session.session_token)
    .await
    .unwrap();

    let result = authenticate(&store).execute(&out.access_token).await;
    assert!(
        matches!(result, Err(ApiError::SessionTerminated)),
        "expected SessionTerminated, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_every_token_after_sessions_reset() {
    let user = test_user("a@x.com");
    let store = MemoryStore::with_users(vec![user.clone()]);
    let first = login(&store, "a@x.com").await;
    let second = login(&store, "a@x.com").await;

    ResetSessionsUseCase {
        users: store.clone(),
        sessions: store.clone(),
    }
    .execute(ResetSessionsInput {
        email: "a@x.com".to_owned(),
        password: TEST_PASSWORD.to_owned(),
    })
    .await
    .unwrap();

    for token in [first.access_token, second.access_token] {
        let result = authenticate(&store).execute(&token).await;
        assert!(
            matches!(result, Err(ApiError::SessionTerminated)),
            "expected SessionTerminated, got {result:?}"
        );
    }
}

#[tokio::test]
async fn should_report_suspension_before_session_liveness() {
    let user = test_user("a@x.com");
    let store = MemoryStore::with_users(vec![user.clone()]);
    let out = login(&store, "a@x.com").await;

    {
        let mut state = store.state();
        state.sessions.clear();
        let stored = state.users.iter_mut().find(|u| u.id == user.id).unwrap();
        stored.is_suspended = true;
        stored.suspension_reason = Some("Exceeded concurrent device limit (3).".to_owned());
    }

    let result = authenticate(&store).execute(&out.access_token).await;
    match result {
        Err(ApiError::AccountSuspended(reason)) => {
            assert_eq!(reason, "Exceeded concurrent device limit (3).");
        }
        other => panic!("expected AccountSuspended, got {other:?}"),
    }
}

#[tokio::test]
async fn should_reject_token_signed_with_another_secret() {
    let user = test_user("a@x.com");
    let store = MemoryStore::with_users(vec![user.clone()]);
    let out = login(&store, "a@x.com").await;

    let result = AuthenticateUseCase {
        users: store.clone(),
        sessions: store.clone(),
        jwt_secret: "other-secret".to_owned(),
    }
    .execute(&out.access_token)
    .await;

    assert!(
        matches!(result, Err(ApiError::InvalidToken)),
        "expected InvalidToken, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_garbage_token() {
    let store = MemoryStore::new();
    let result = authenticate(&store).execute("not.a.jwt").await;
    assert!(matches!(result, Err(ApiError::InvalidToken)));
}

#[tokio::test]
async fn should_reject_token_of_deleted_user() {
    let admin = test_admin("admin@x.com");
    let user = test_user("a@x.com");
    let store = MemoryStore::with_users(vec![admin.clone(), user.clone()]);
    let out = login(&store, "a@x.com").await;
    authenticate(&store)
        .execute(&out.access_token)
        .await
        .unwrap();

    DeleteUserUseCase {
        users: store.clone(),
    }
    .execute(&admin, user.id)
    .await
    .unwrap();

    let result = authenticate(&store).execute(&out.access_token).await;
    assert!(
        matches!(result, Err(ApiError::TokenSubjectNotFound)),
        "expected TokenSubjectNotFound, got {result:?}"
    );
    assert_eq!(store.session_count(user.id), 0);
}

#[tokio::test]
async fn should_carry_freshly_loaded_role_in_context() {
    use homeswap_domain::user::UserRole;

    let store = MemoryStore::with_users(vec![test_user("u@x.com"), test_admin("admin@x.com")]);
    let user_token = login(&store, "u@x.com").await.access_token;
    let admin_token = login(&store, "admin@x.com").await.access_token;

    // Demote after the token was issued: the stored role wins.
    store.state().users[1].role = UserRole::User;

    let user_ctx = authenticate(&store).execute(&user_token).await.unwrap();
    let admin_ctx = authenticate(&store).execute(&admin_token).await.unwrap();

    assert_eq!(user_ctx.user.role, UserRole::User);
    assert!(!admin_ctx.user.role.is_admin());
}
