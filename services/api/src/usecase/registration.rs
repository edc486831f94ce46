use chrono::{Duration, Utc};
use rand::RngExt;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use homeswap_domain::otp::{OTP_MAX, OTP_MIN, OtpMethod};
use homeswap_domain::user::UserRole;

use crate::domain::registration::{
    CompletionParams, OtpState, complete, resend_cooldown_remaining,
};
use crate::domain::repository::{BadgeRepository, RegistrationRepository, UserRepository};
use crate::domain::types::{
    ActiveSession, DeliveryChannel, EmailClaim, OTP_TTL_SECS, OtpVerification, OutboxEvent,
    PendingUser, REFERRAL_CODE_LEN, User,
};
use crate::error::ApiError;
use crate::usecase::badge::award_referral_milestone;
use crate::usecase::password::{hash_password, validate_new_password};
use crate::usecase::token::{TokenIssuer, generate_session_token};

/// Charset for referral codes (uppercase alphanumeric).
const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

const REFERRAL_CODE_ATTEMPTS: usize = 5;

fn generate_referral_code() -> String {
    let mut rng = rand::rng();
    (0..REFERRAL_CODE_LEN)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}

fn generate_otp_code() -> String {
    rand::rng().random_range(OTP_MIN..=OTP_MAX).to_string()
}

async fn allocate_referral_code<U: UserRepository>(users: &U) -> Result<String, ApiError> {
    for _ in 0..REFERRAL_CODE_ATTEMPTS {
        let code = generate_referral_code();
        if !users.referral_code_taken(&code).await? {
            return Ok(code);
        }
    }
    Err(anyhow::anyhow!("no free referral code after {REFERRAL_CODE_ATTEMPTS} attempts").into())
}

/// Create an OTP for `pending` and enqueue its delivery.
async fn issue_otp<R: RegistrationRepository>(
    registrations: &R,
    pending: &PendingUser,
    method: OtpMethod,
) -> Result<(), ApiError> {
    let recipient = match method {
        OtpMethod::Email => pending.email.clone(),
        OtpMethod::Phone => pending
            .phone_number
            .clone()
            .ok_or_else(|| ApiError::validation("phone number missing"))?,
    };

    let now = Utc::now();
    let otp = OtpVerification {
        id: Uuid::now_v7(),
        pending_user_id: pending.id,
        code: generate_otp_code(),
        method,
        expires_at: now + Duration::seconds(OTP_TTL_SECS),
        verified_at: None,
        created_at: now,
    };

    let event = OutboxEvent {
        id: Uuid::new_v4(),
        kind: "otp_requested".to_owned(),
        channel: DeliveryChannel::from(method),
        recipient,
        payload: json!({
            "fullName": pending.full_name,
            "code": otp.code,
            "expiresInSecs": OTP_TTL_SECS,
        }),
        idempotency_key: format!("otp_requested:{}", otp.id),
    };

    registrations.issue_otp(&otp, &event).await?;
    info!(pending_user_id = %pending.id, method = %method, "otp issued");
    Ok(())
}

// ── Register ─────────────────────────────────────────────────────────────────

/// Registration form, already validated at the boundary.
pub struct RegisterInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub phone_number: Option<String>,
    pub referral_code: Option<String>,
}

#[derive(Debug)]
pub struct RegisterOutput {
    pub pending_user_id: Uuid,
}

pub struct RegisterUseCase<R: RegistrationRepository> {
    pub registrations: R,
}

impl<R: RegistrationRepository> RegisterUseCase<R> {
    pub async fn execute(&self, input: RegisterInput) -> Result<RegisterOutput, ApiError> {
        // Email is unique across users and pending users together.
        match self.registrations.email_claim(&input.email).await? {
            EmailClaim::Free => {}
            EmailClaim::User => return Err(ApiError::EmailInUse),
            EmailClaim::Pending => return Err(ApiError::EmailPendingVerification),
        }

        let pending = PendingUser {
            id: Uuid::now_v7(),
            email: input.email,
            password_hash: hash_password(&input.password)?,
            full_name: format!("{} {}", input.first_name, input.last_name),
            phone_number: input.phone_number,
            referral_code: input.referral_code,
            role: UserRole::User,
            created_at: Utc::now(),
        };

        self.registrations.create_pending(&pending).await?;
        info!(pending_user_id = %pending.id, "registration pending verification");

        Ok(RegisterOutput {
            pending_user_id: pending.id,
        })
    }
}

// ── SeedSuperAdmin ───────────────────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq)]
pub enum SeedOutcome {
    /// A SUPER_ADMIN registration was created and an email OTP sent to it.
    Pending(Uuid),
    /// The email already belongs to a user or a pending registration.
    AlreadyClaimed,
}

/// Bootstraps the first administrator. The seeded account is a pending
/// registration with role SUPER_ADMIN; it becomes a user through the normal
/// OTP verification.
pub struct SeedSuperAdminUseCase<R: RegistrationRepository> {
    pub registrations: R,
}

impl<R: RegistrationRepository> SeedSuperAdminUseCase<R> {
    pub async fn execute(&self, email: &str, password: &str) -> Result<SeedOutcome, ApiError> {
        if self.registrations.email_claim(email).await? != EmailClaim::Free {
            return Ok(SeedOutcome::AlreadyClaimed);
        }
        validate_new_password(password)?;

        let pending = PendingUser {
            id: Uuid::now_v7(),
            email: email.to_owned(),
            password_hash: hash_password(password)?,
            full_name: "Super Admin".to_owned(),
            phone_number: None,
            referral_code: None,
            role: UserRole::SuperAdmin,
            created_at: Utc::now(),
        };
        self.registrations.create_pending(&pending).await?;
        issue_otp(&self.registrations, &pending, OtpMethod::Email).await?;
        info!(pending_user_id = %pending.id, "super admin seeded, awaiting verification");

        Ok(SeedOutcome::Pending(pending.id))
    }
}

// ── SendOtp ──────────────────────────────────────────────────────────────────

pub struct SendOtpInput {
    pub pending_user_id: Uuid,
    pub method: OtpMethod,
}

pub struct SendOtpUseCase<R: RegistrationRepository> {
    pub registrations: R,
}

impl<R: RegistrationRepository> SendOtpUseCase<R> {
    pub async fn execute(&self, input: SendOtpInput) -> Result<(), ApiError> {
        let pending = self
            .registrations
            .find_pending(input.pending_user_id)
            .await?
            .ok_or(ApiError::PendingUserNotFound)?;

        issue_otp(&self.registrations, &pending, input.method).await
    }
}

// ── ResendOtp ────────────────────────────────────────────────────────────────

pub struct ResendOtpUseCase<R: RegistrationRepository> {
    pub registrations: R,
}

impl<R: RegistrationRepository> ResendOtpUseCase<R> {
    /// Same as send, throttled per method.
    pub async fn execute(&self, input: SendOtpInput) -> Result<(), ApiError> {
        let pending = self
            .registrations
            .find_pending(input.pending_user_id)
            .await?
            .ok_or(ApiError::PendingUserNotFound)?;

        let last = self
            .registrations
            .latest_otp(pending.id, input.method)
            .await?;
        if let Some(retry_after_secs) =
            resend_cooldown_remaining(last.map(|o| o.created_at), Utc::now())
        {
            return Err(ApiError::OtpResendTooSoon { retry_after_secs });
        }

        issue_otp(&self.registrations, &pending, input.method).await
    }
}

// ── VerifyOtp ────────────────────────────────────────────────────────────────

pub struct VerifyOtpInput {
    pub pending_user_id: Uuid,
    pub code: String,
    pub ip_address: String,
}

#[derive(Debug)]
pub struct VerifyOtpOutput {
    pub user: User,
    pub session: ActiveSession,
    pub access_token: String,
    pub access_token_exp: u64,
}

pub struct VerifyOtpUseCase<U, R, B>
where
    U: UserRepository,
    R: RegistrationRepository,
    B: BadgeRepository,
{
    pub users: U,
    pub registrations: R,
    pub badges: B,
    pub tokens: TokenIssuer,
}

impl<U, R, B> VerifyOtpUseCase<U, R, B>
where
    U: UserRepository,
    R: RegistrationRepository,
    B: BadgeRepository,
{
    pub async fn execute(&self, input: VerifyOtpInput) -> Result<VerifyOtpOutput, ApiError> {
        let now = Utc::now();

        // 1. Most recent live OTP with this code. A consumed or purged OTP
        //    lands here too, which makes a second verification fail.
        let otp = self
            .registrations
            .find_live_otp(input.pending_user_id, &input.code, now)
            .await?
            .ok_or(ApiError::InvalidOtp)?;
        if otp.state(now) != OtpState::Live {
            return Err(ApiError::InvalidOtp);
        }

        let pending = self
            .registrations
            .find_pending(input.pending_user_id)
            .await?
            .ok_or(ApiError::InvalidOtp)?;

        // 2. Resolve the referrer, if the quoted code names one.
        let referrer = match pending.referral_code.as_deref() {
            Some(code) => self.users.find_by_referral_code(code).await?,
            None => None,
        };

        // 3. Build and apply the completion in one transaction.
        let referral_code = allocate_referral_code(&self.users).await?;
        let completion = complete(CompletionParams {
            pending,
            otp: &otp,
            referrer: referrer.as_ref(),
            referral_code,
            session_token: generate_session_token(),
            ip_address: input.ip_address,
            now,
        });
        let outcome = self.registrations.complete(&completion).await?;
        info!(
            user_id = %completion.user.id,
            pending_user_id = %completion.pending_user_id,
            "registration verified"
        );

        // 4. Referral ladder, after commit.
        if let Some((referrer_id, total)) = outcome.referrer_total {
            award_referral_milestone(&self.badges, referrer_id, total).await;
        }

        let (access_token, access_token_exp) = self
            .tokens
            .issue(&completion.user, &completion.session.session_token)?;

        Ok(VerifyOtpOutput {
            user: completion.user,
            session: completion.session,
            access_token,
            access_token_exp,
        })
    }
}
