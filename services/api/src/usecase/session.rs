use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::repository::{SessionRepository, UserRepository};
use crate::domain::types::{ActiveSession, MAX_ACTIVE_SESSIONS, SessionAdmission, User};
use crate::error::ApiError;
use crate::usecase::password::verify_password;
use crate::usecase::token::{TokenIssuer, generate_session_token};

/// Look up a user and check the password. No side effects.
///
/// An unknown email and a wrong password both yield `None`.
pub async fn validate_user_credentials<U: UserRepository>(
    users: &U,
    email: &str,
    password: &str,
) -> Result<Option<User>, ApiError> {
    let Some(user) = users.find_by_email(email).await? else {
        return Ok(None);
    };
    if !verify_password(&user.password_hash, password) {
        return Ok(None);
    }
    Ok(Some(user))
}

// ── Login ────────────────────────────────────────────────────────────────────

pub struct LoginInput {
    pub email: String,
    pub password: String,
    pub ip_address: String,
}

#[derive(Debug)]
pub struct LoginOutput {
    pub user: User,
    pub session: ActiveSession,
    pub access_token: String,
    pub access_token_exp: u64,
}

pub struct LoginUseCase<U: UserRepository, S: SessionRepository> {
    pub users: U,
    pub sessions: S,
    pub tokens: TokenIssuer,
}

impl<U: UserRepository, S: SessionRepository> LoginUseCase<U, S> {
    pub async fn execute(&self, input: LoginInput) -> Result<LoginOutput, ApiError> {
        let user = self
            .users
            .find_by_email(&input.email)
            .await?
            .ok_or(ApiError::InvalidCredentials)?;

        // Suspension wins over a wrong password.
        if user.is_suspended {
            return Err(ApiError::AccountSuspended(user.suspension_message()));
        }
        if !verify_password(&user.password_hash, &input.password) {
            return Err(ApiError::InvalidCredentials);
        }

        let now = Utc::now();
        let candidate = ActiveSession {
            id: Uuid::now_v7(),
            user_id: user.id,
            session_token: generate_session_token(),
            ip_address: input.ip_address,
            last_activity: now,
            created_at: now,
        };

        // Reaching the cap suspends the account and rejects this attempt.
        let session = match self.sessions.admit(&candidate, MAX_ACTIVE_SESSIONS).await? {
            SessionAdmission::Admitted(session) => session,
            SessionAdmission::Suspended { reason } => {
                warn!(user_id = %user.id, reason = %reason, "session limit exceeded, account suspended");
                return Err(ApiError::AccountSuspended(reason));
            }
            SessionAdmission::AlreadySuspended { reason } => {
                return Err(ApiError::AccountSuspended(reason));
            }
        };

        let (access_token, access_token_exp) = self.tokens.issue(&user, &session.session_token)?;
        info!(user_id = %user.id, session_id = %session.id, "login succeeded");

        Ok(LoginOutput {
            user,
            session,
            access_token,
            access_token_exp,
        })
    }
}

// ── Logout ───────────────────────────────────────────────────────────────────

pub struct LogoutUseCase<S: SessionRepository> {
    pub sessions: S,
}

impl<S: SessionRepository> LogoutUseCase<S> {
    /// Idempotent: a second logout with the same token deletes nothing.
    pub async fn execute(&self, user_id: Uuid, session_token: &str) -> Result<(), ApiError> {
        let rows = self.sessions.delete(user_id, session_token).await?;
        if rows == 0 {
            warn!(user_id = %user_id, "logout matched no session");
        } else {
            info!(user_id = %user_id, rows, "logged out");
        }
        Ok(())
    }
}

// ── ResetSessionsAndSuspension ───────────────────────────────────────────────

pub struct ResetSessionsInput {
    pub email: String,
    pub password: String,
}

pub struct ResetSessionsUseCase<U: UserRepository, S: SessionRepository> {
    pub users: U,
    pub sessions: S,
}

impl<U: UserRepository, S: SessionRepository> ResetSessionsUseCase<U, S> {
    /// Self-service escape from the device lockout: re-authenticate, then drop
    /// every session and lift the suspension. Returns sessions deleted.
    pub async fn execute(&self, input: ResetSessionsInput) -> Result<u64, ApiError> {
        let user = validate_user_credentials(&self.users, &input.email, &input.password)
            .await?
            .ok_or(ApiError::RecoveryDenied)?;

        let rows = self.sessions.terminate_all(user.id).await?;
        info!(user_id = %user.id, rows, "all sessions terminated and suspension lifted");
        Ok(rows)
    }
}
