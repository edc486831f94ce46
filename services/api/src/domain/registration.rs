//! Pending-registration state machine.
//!
//! ```text
//! [none] --register--> Pending
//! Pending --send/resend--> Pending + live OTP
//! Pending + live OTP --verify--> User (OTPs purged, pending row deleted, one session)
//! ```
//!
//! The functions here are pure. Repositories carry out the returned plan.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::domain::types::{
    ActiveSession, OTP_RESEND_COOLDOWN_SECS, OtpVerification, PendingUser, REFERRAL_REWARD, User,
};

/// Lifecycle position of a single OTP row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpState {
    Live,
    Consumed,
    Expired,
}

impl OtpVerification {
    /// Valid while unverified and `expires_at >= now`.
    pub fn state(&self, now: DateTime<Utc>) -> OtpState {
        if self.verified_at.is_some() {
            OtpState::Consumed
        } else if self.expires_at < now {
            OtpState::Expired
        } else {
            OtpState::Live
        }
    }
}

/// Seconds left before another OTP of the same method may be issued, if any.
pub fn resend_cooldown_remaining(
    last_issued_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<i64> {
    let last = last_issued_at?;
    let ready_at = last + Duration::seconds(OTP_RESEND_COOLDOWN_SECS);
    if now < ready_at {
        // Round up so callers never see "wait 0 seconds".
        let millis = (ready_at - now).num_milliseconds();
        Some((millis + 999) / 1000)
    } else {
        None
    }
}

/// Referrer credit applied inside the completion transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferralCredit {
    pub referrer_id: Uuid,
    pub reward: i64,
}

/// Everything a successful verification writes, in one unit.
#[derive(Debug, Clone)]
pub struct Completion {
    pub otp_id: Uuid,
    pub pending_user_id: Uuid,
    pub user: User,
    pub referral: Option<ReferralCredit>,
    pub session: ActiveSession,
}

/// What the store reports back after applying a [`Completion`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionOutcome {
    /// Referrer id and their total after the increment.
    pub referrer_total: Option<(Uuid, u32)>,
}

pub struct CompletionParams<'a> {
    pub pending: PendingUser,
    pub otp: &'a OtpVerification,
    pub referrer: Option<&'a User>,
    pub referral_code: String,
    pub session_token: String,
    pub ip_address: String,
    pub now: DateTime<Utc>,
}

/// Turn a pending registration plus its matched OTP into the write plan.
///
/// `referred_by` keeps the code the registrant quoted even when it does not
/// resolve to a user; only a resolved referrer is credited.
pub fn complete(params: CompletionParams<'_>) -> Completion {
    let CompletionParams {
        pending,
        otp,
        referrer,
        referral_code,
        session_token,
        ip_address,
        now,
    } = params;

    let user_id = Uuid::now_v7();
    let user = User {
        id: user_id,
        email: pending.email,
        password_hash: pending.password_hash,
        full_name: pending.full_name,
        role: pending.role,
        is_suspended: false,
        suspension_reason: None,
        referral_code: Some(referral_code),
        referred_by: pending.referral_code,
        total_referrals: 0,
        balance: 0,
        created_at: now,
    };

    Completion {
        otp_id: otp.id,
        pending_user_id: pending.id,
        user,
        referral: referrer.map(|r| ReferralCredit {
            referrer_id: r.id,
            reward: REFERRAL_REWARD,
        }),
        session: ActiveSession {
            id: Uuid::now_v7(),
            user_id,
            session_token,
            ip_address,
            last_activity: now,
            created_at: now,
        },
    }
}
