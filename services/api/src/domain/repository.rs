#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use homeswap_domain::badge::BadgeType;
use homeswap_domain::exchange::{ExchangeStatus, Transition};
use homeswap_domain::otp::OtpMethod;
use homeswap_domain::user::UserRole;

use crate::domain::registration::{Completion, CompletionOutcome};
use crate::domain::types::{
    ActiveSession, AwardOutcome, EmailClaim, ExchangeRequest, ExchangeRequestDetail,
    OtpVerification, OutboxEvent, PendingUser, SessionAdmission, TradeProgress, User,
};
use crate::error::ApiError;

/// Verified user accounts.
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError>;

    async fn find_by_referral_code(&self, code: &str) -> Result<Option<User>, ApiError>;

    async fn referral_code_taken(&self, code: &str) -> Result<bool, ApiError>;

    /// Returns `false` if the user does not exist.
    async fn set_role(&self, id: Uuid, role: UserRole) -> Result<bool, ApiError>;

    async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> Result<(), ApiError>;

    /// Store a reset-token digest and enqueue its delivery atomically.
    async fn set_reset_token_with_outbox(
        &self,
        id: Uuid,
        token_digest: &str,
        expires_at: DateTime<Utc>,
        event: &OutboxEvent,
    ) -> Result<(), ApiError>;

    /// Find the user holding an unexpired reset token with this digest.
    async fn find_by_reset_digest(
        &self,
        token_digest: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, ApiError>;

    /// Set a new password hash and clear the reset-token fields.
    async fn complete_password_reset(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<(), ApiError>;

    async fn list_badges(&self, id: Uuid) -> Result<Vec<BadgeType>, ApiError>;

    /// Hard delete. Sessions, badges, properties and exchange requests go
    /// with the user. Returns `false` if the user does not exist.
    async fn delete_by_id(&self, id: Uuid) -> Result<bool, ApiError>;
}

/// Active sessions. Shared by the session manager and the request guard.
pub trait SessionRepository: Send + Sync {
    /// Open `session` unless the owner already has `max` sessions, in which
    /// case the owner is suspended instead. Count and write happen under one
    /// lock on the owner so concurrent logins cannot exceed `max`.
    async fn admit(&self, session: &ActiveSession, max: u64)
    -> Result<SessionAdmission, ApiError>;

    async fn find(
        &self,
        user_id: Uuid,
        session_token: &str,
    ) -> Result<Option<ActiveSession>, ApiError>;

    async fn touch(&self, session_id: Uuid, at: DateTime<Utc>) -> Result<(), ApiError>;

    /// Delete sessions matching (user, token). Returns rows deleted.
    async fn delete(&self, user_id: Uuid, session_token: &str) -> Result<u64, ApiError>;

    /// Delete every session of the user and lift any suspension, atomically.
    /// Returns sessions deleted.
    async fn terminate_all(&self, user_id: Uuid) -> Result<u64, ApiError>;

    /// Delete sessions whose last activity is before `cutoff`.
    async fn delete_inactive_since(&self, cutoff: DateTime<Utc>) -> Result<u64, ApiError>;
}

/// Pending registrations and their OTP challenges.
pub trait RegistrationRepository: Send + Sync {
    async fn email_claim(&self, email: &str) -> Result<EmailClaim, ApiError>;

    /// Fails with a conflict if the email was claimed concurrently.
    async fn create_pending(&self, pending: &PendingUser) -> Result<(), ApiError>;

    async fn find_pending(&self, id: Uuid) -> Result<Option<PendingUser>, ApiError>;

    /// Insert an OTP and its delivery event in the same transaction.
    async fn issue_otp(&self, otp: &OtpVerification, event: &OutboxEvent)
    -> Result<(), ApiError>;

    /// Most recent OTP of `method` for the pending user, any state.
    async fn latest_otp(
        &self,
        pending_user_id: Uuid,
        method: OtpMethod,
    ) -> Result<Option<OtpVerification>, ApiError>;

    /// Most recent unverified, unexpired OTP with this code.
    async fn find_live_otp(
        &self,
        pending_user_id: Uuid,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<OtpVerification>, ApiError>;

    /// Apply a verification in one transaction: consume the OTP, insert the
    /// user, credit the referrer, purge OTPs, delete the pending row and open
    /// the first session.
    async fn complete(&self, completion: &Completion) -> Result<CompletionOutcome, ApiError>;

    /// Delete pending registrations created before `cutoff`. Returns rows deleted.
    async fn delete_pending_before(&self, cutoff: DateTime<Utc>) -> Result<u64, ApiError>;
}

/// Badge associations.
pub trait BadgeRepository: Send + Sync {
    /// Idempotent: awarding a held badge reports `AlreadyHeld`.
    async fn award(&self, user_id: Uuid, badge: BadgeType) -> Result<AwardOutcome, ApiError>;
}

/// Exchange requests and the properties they reference.
pub trait ExchangeRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ExchangeRequest>, ApiError>;

    /// Persist `transition` for a request currently in `from`, in one
    /// transaction: status update, property marks, and the accepted-as-recipient
    /// counts of each user the transition evaluates, before and after.
    ///
    /// Fails with `ExchangeNotPending` if the stored status is no longer `from`.
    async fn commit_transition(
        &self,
        id: Uuid,
        from: ExchangeStatus,
        transition: &Transition,
    ) -> Result<Vec<TradeProgress>, ApiError>;

    async fn find_detail(&self, id: Uuid) -> Result<Option<ExchangeRequestDetail>, ApiError>;
}
