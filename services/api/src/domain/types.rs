use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use homeswap_domain::badge::BadgeType;
use homeswap_domain::exchange::{ExchangeParties, ExchangeStatus};
use homeswap_domain::otp::OtpMethod;
use homeswap_domain::user::UserRole;

/// Verified account.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub role: UserRole,
    pub is_suspended: bool,
    pub suspension_reason: Option<String>,
    pub referral_code: Option<String>,
    /// Referral code quoted at registration.
    pub referred_by: Option<String>,
    pub total_referrals: u32,
    pub balance: i64,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Reason reported to a suspended user.
    pub fn suspension_message(&self) -> String {
        self.suspension_reason
            .clone()
            .unwrap_or_else(|| "no reason recorded".to_owned())
    }
}

/// Registration awaiting OTP verification.
#[derive(Debug, Clone)]
pub struct PendingUser {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub phone_number: Option<String>,
    pub referral_code: Option<String>,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct OtpVerification {
    pub id: Uuid,
    pub pending_user_id: Uuid,
    pub code: String,
    pub method: OtpMethod,
    pub expires_at: DateTime<Utc>,
    pub verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// One concurrently logged-in client of a user.
#[derive(Debug, Clone)]
pub struct ActiveSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub session_token: String,
    pub ip_address: String,
    pub last_activity: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Result of trying to open a session under the concurrent-session cap.
#[derive(Debug, Clone)]
pub enum SessionAdmission {
    Admitted(ActiveSession),
    /// The cap was already reached; the account is now suspended with `reason`.
    Suspended { reason: String },
    /// The account was already suspended when the row lock was taken.
    AlreadySuspended { reason: String },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub is_exchanged: bool,
}

#[derive(Debug, Clone)]
pub struct ExchangeRequest {
    pub id: Uuid,
    pub message: String,
    pub status: ExchangeStatus,
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
    pub from_property_id: Uuid,
    pub to_property_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ExchangeRequest {
    pub fn parties(&self) -> ExchangeParties {
        ExchangeParties {
            from_user_id: self.from_user_id,
            to_user_id: self.to_user_id,
            from_property_id: self.from_property_id,
            to_property_id: self.to_property_id,
        }
    }
}

/// Public view of a user, safe to embed in responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: UserRole,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            role: user.role,
        }
    }
}

/// Exchange request with both parties and both properties loaded.
#[derive(Debug, Clone)]
pub struct ExchangeRequestDetail {
    pub request: ExchangeRequest,
    pub from_user: UserSummary,
    pub to_user: UserSummary,
    pub from_property: Property,
    pub to_property: Property,
}

/// A party's accepted-as-recipient count around an acceptance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradeProgress {
    pub user_id: Uuid,
    pub before: u64,
    pub after: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AwardOutcome {
    Awarded,
    AlreadyHeld,
}

/// Profile of the authenticated user.
#[derive(Debug, Clone)]
pub struct Profile {
    pub user: User,
    pub badges: Vec<BadgeType>,
}

/// Which namespace already holds an email address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailClaim {
    Free,
    User,
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryChannel {
    Email,
    Sms,
}

impl DeliveryChannel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Sms => "sms",
        }
    }
}

impl From<OtpMethod> for DeliveryChannel {
    fn from(method: OtpMethod) -> Self {
        match method {
            OtpMethod::Email => Self::Email,
            OtpMethod::Phone => Self::Sms,
        }
    }
}

/// Outbox event for async delivery (OTP codes, password-reset links).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxEvent {
    pub id: Uuid,
    pub kind: String,
    pub channel: DeliveryChannel,
    pub recipient: String,
    pub payload: serde_json::Value,
    pub idempotency_key: String,
}

/// Maximum number of concurrent sessions per user.
pub const MAX_ACTIVE_SESSIONS: u64 = 3;

/// Sessions idle longer than this are swept.
pub const SESSION_RETENTION_DAYS: i64 = 7;

/// OTP time-to-live in seconds.
pub const OTP_TTL_SECS: i64 = 300;

/// Minimum gap between two OTPs of the same method for one registration.
pub const OTP_RESEND_COOLDOWN_SECS: i64 = 60;

/// Password-reset token time-to-live in seconds.
pub const RESET_TOKEN_TTL_SECS: i64 = 900;

/// Balance credited to a referrer per verified referral.
pub const REFERRAL_REWARD: i64 = 3;

pub const REFERRAL_CODE_LEN: usize = 8;

pub const MIN_PASSWORD_LEN: usize = 6;

/// Recorded when the client address cannot be determined.
pub const UNKNOWN_IP: &str = "Unknown";

pub fn session_limit_reason() -> String {
    format!("Exceeded concurrent device limit ({MAX_ACTIVE_SESSIONS}).")
}
