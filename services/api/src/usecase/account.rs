use chrono::{Duration, Utc};
use rand::RngExt;
use serde_json::json;
use sha2::{Digest, Sha256};
use tracing::info;
use uuid::Uuid;

use homeswap_domain::user::UserRole;

use crate::domain::repository::UserRepository;
use crate::domain::types::{DeliveryChannel, OutboxEvent, Profile, RESET_TOKEN_TTL_SECS, User};
use crate::error::ApiError;
use crate::usecase::password::{hash_password, validate_new_password, verify_password};

/// Only the SHA-256 digest of a reset token is stored.
pub fn reset_token_digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

fn generate_reset_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    hex::encode(bytes)
}

// ── ForgotPassword ───────────────────────────────────────────────────────────

pub struct ForgotPasswordUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> ForgotPasswordUseCase<U> {
    pub async fn execute(&self, email: &str) -> Result<(), ApiError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(ApiError::UserNotFound)?;

        let token = generate_reset_token();
        let expires_at = Utc::now() + Duration::seconds(RESET_TOKEN_TTL_SECS);
        let event_id = Uuid::new_v4();
        let event = OutboxEvent {
            id: event_id,
            kind: "password_reset_requested".to_owned(),
            channel: DeliveryChannel::Email,
            recipient: user.email.clone(),
            payload: json!({
                "token": token,
                "expiresAt": expires_at.to_rfc3339(),
            }),
            idempotency_key: format!("password_reset_requested:{event_id}"),
        };

        self.users
            .set_reset_token_with_outbox(user.id, &reset_token_digest(&token), expires_at, &event)
            .await?;
        info!(user_id = %user.id, "password reset requested");
        Ok(())
    }
}

// ── ResetPassword ────────────────────────────────────────────────────────────

pub struct ResetPasswordInput {
    pub token: String,
    pub new_password: String,
}

pub struct ResetPasswordUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> ResetPasswordUseCase<U> {
    pub async fn execute(&self, input: ResetPasswordInput) -> Result<(), ApiError> {
        validate_new_password(&input.new_password)?;

        let user = self
            .users
            .find_by_reset_digest(&reset_token_digest(&input.token), Utc::now())
            .await?
            .ok_or(ApiError::InvalidResetToken)?;

        let password_hash = hash_password(&input.new_password)?;
        self.users
            .complete_password_reset(user.id, &password_hash)
            .await?;
        info!(user_id = %user.id, "password reset");
        Ok(())
    }
}

// ── ChangePassword ───────────────────────────────────────────────────────────

pub struct ChangePasswordInput {
    pub current_password: String,
    pub new_password: String,
}

pub struct ChangePasswordUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> ChangePasswordUseCase<U> {
    pub async fn execute(&self, user: &User, input: ChangePasswordInput) -> Result<(), ApiError> {
        if !verify_password(&user.password_hash, &input.current_password) {
            return Err(ApiError::validation("current password is incorrect"));
        }
        validate_new_password(&input.new_password)?;

        let password_hash = hash_password(&input.new_password)?;
        self.users.set_password_hash(user.id, &password_hash).await?;
        info!(user_id = %user.id, "password changed");
        Ok(())
    }
}

// ── Profile ──────────────────────────────────────────────────────────────────

pub struct GetProfileUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> GetProfileUseCase<U> {
    pub async fn execute(&self, user: User) -> Result<Profile, ApiError> {
        let badges = self.users.list_badges(user.id).await?;
        Ok(Profile { user, badges })
    }
}

// ── UpdateRole ───────────────────────────────────────────────────────────────

pub struct UpdateRoleUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> UpdateRoleUseCase<U> {
    pub async fn execute(
        &self,
        actor: &User,
        target_id: Uuid,
        role: UserRole,
    ) -> Result<(), ApiError> {
        if !actor.role.is_admin() {
            return Err(ApiError::Forbidden);
        }
        if !self.users.set_role(target_id, role).await? {
            return Err(ApiError::UserNotFound);
        }
        info!(actor_id = %actor.id, user_id = %target_id, role = %role, "role updated");
        Ok(())
    }
}

// ── DeleteUser ───────────────────────────────────────────────────────────────

pub struct DeleteUserUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> DeleteUserUseCase<U> {
    /// Tokens already issued to the deleted user fail authentication from
    /// the next request on.
    pub async fn execute(&self, actor: &User, target_id: Uuid) -> Result<(), ApiError> {
        if !actor.role.is_admin() {
            return Err(ApiError::Forbidden);
        }
        if !self.users.delete_by_id(target_id).await? {
            return Err(ApiError::UserNotFound);
        }
        info!(actor_id = %actor.id, user_id = %target_id, "user deleted");
        Ok(())
    }
}
