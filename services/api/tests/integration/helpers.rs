use std::collections::HashMap;
use std::sync::{Arc, LazyLock, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use homeswap_api::domain::registration::{Completion, CompletionOutcome};
use homeswap_api::domain::repository::{
    BadgeRepository, ExchangeRepository, RegistrationRepository, SessionRepository,
    UserRepository,
};
use homeswap_api::domain::types::{
    ActiveSession, AwardOutcome, EmailClaim, ExchangeRequest, ExchangeRequestDetail,
    OtpVerification, OutboxEvent, PendingUser, Property, SessionAdmission, TradeProgress, User,
    UserSummary, session_limit_reason,
};
use homeswap_api::error::ApiError;
use homeswap_api::usecase::password::hash_password;
use homeswap_api::usecase::token::TokenIssuer;
use homeswap_domain::badge::BadgeType;
use homeswap_domain::exchange::{ExchangeStatus, Transition};
use homeswap_domain::otp::OtpMethod;
use homeswap_domain::user::UserRole;

pub const TEST_SECRET: &str = "test-secret";
pub const TEST_PASSWORD: &str = "password123";

/// Hashing is slow; every fixture user shares one hash of [`TEST_PASSWORD`].
pub static TEST_PASSWORD_HASH: LazyLock<String> =
    LazyLock::new(|| hash_password(TEST_PASSWORD).unwrap());

pub fn token_issuer() -> TokenIssuer {
    TokenIssuer {
        jwt_secret: TEST_SECRET.to_owned(),
        ttl_secs: 3_600,
    }
}

pub fn test_user(email: &str) -> User {
    User {
        id: Uuid::now_v7(),
        email: email.to_owned(),
        password_hash: TEST_PASSWORD_HASH.clone(),
        full_name: "Test User".to_owned(),
        role: UserRole::User,
        is_suspended: false,
        suspension_reason: None,
        referral_code: None,
        referred_by: None,
        total_referrals: 0,
        balance: 0,
        created_at: Utc::now(),
    }
}

pub fn test_admin(email: &str) -> User {
    User {
        role: UserRole::Admin,
        ..test_user(email)
    }
}

// ── MemoryStore ──────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct StoreState {
    pub users: Vec<User>,
    pub pending: Vec<PendingUser>,
    pub otps: Vec<OtpVerification>,
    pub sessions: Vec<ActiveSession>,
    pub badges: Vec<(Uuid, BadgeType)>,
    pub reset_tokens: HashMap<Uuid, (String, DateTime<Utc>)>,
    pub outbox: Vec<OutboxEvent>,
    pub properties: Vec<Property>,
    pub exchanges: Vec<ExchangeRequest>,
    /// When set, every badge award fails.
    pub fail_badge_awards: bool,
}

impl StoreState {
    fn accepted_as_recipient(&self, user_id: Uuid) -> u64 {
        self.exchanges
            .iter()
            .filter(|e| e.to_user_id == user_id && e.status == ExchangeStatus::Accepted)
            .count() as u64
    }
}

/// In-memory stand-in for every repository. Clones share one state, so a
/// test can hand copies to several use cases and inspect the result.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: Vec<User>) -> Self {
        let store = Self::new();
        store.state().users = users;
        store
    }

    pub fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap()
    }

    pub fn user(&self, id: Uuid) -> User {
        self.state()
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .unwrap()
    }

    pub fn session_count(&self, user_id: Uuid) -> usize {
        self.state()
            .sessions
            .iter()
            .filter(|s| s.user_id == user_id)
            .count()
    }

    pub fn badges_of(&self, user_id: Uuid) -> Vec<BadgeType> {
        self.state()
            .badges
            .iter()
            .filter(|(u, _)| *u == user_id)
            .map(|(_, b)| *b)
            .collect()
    }

    /// Code of the most recent OTP issued for a pending user.
    pub fn latest_code(&self, pending_user_id: Uuid) -> String {
        self.state()
            .otps
            .iter()
            .filter(|o| o.pending_user_id == pending_user_id)
            .max_by_key(|o| o.created_at)
            .map(|o| o.code.clone())
            .unwrap()
    }

    /// Two users, a property each, and a pending request from `from` to `to`.
    pub fn seed_exchange(&self, from: &User, to: &User) -> ExchangeRequest {
        let mut state = self.state();
        for user in [from, to] {
            if !state.users.iter().any(|u| u.id == user.id) {
                state.users.push(user.clone());
            }
        }
        let from_property = Property {
            id: Uuid::new_v4(),
            owner_id: from.id,
            title: "Lake cabin".to_owned(),
            is_exchanged: false,
        };
        let to_property = Property {
            id: Uuid::new_v4(),
            owner_id: to.id,
            title: "City flat".to_owned(),
            is_exchanged: false,
        };
        let now = Utc::now();
        let request = ExchangeRequest {
            id: Uuid::new_v4(),
            message: "Swap in July?".to_owned(),
            status: ExchangeStatus::Pending,
            from_user_id: from.id,
            to_user_id: to.id,
            from_property_id: from_property.id,
            to_property_id: to_property.id,
            created_at: now,
            updated_at: now,
        };
        state.properties.push(from_property);
        state.properties.push(to_property);
        state.exchanges.push(request.clone());
        request
    }
}

impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError> {
        Ok(self.state().users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        Ok(self.state().users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_referral_code(&self, code: &str) -> Result<Option<User>, ApiError> {
        Ok(self
            .state()
            .users
            .iter()
            .find(|u| u.referral_code.as_deref() == Some(code))
            .cloned())
    }

    async fn referral_code_taken(&self, code: &str) -> Result<bool, ApiError> {
        Ok(self
            .state()
            .users
            .iter()
            .any(|u| u.referral_code.as_deref() == Some(code)))
    }

    async fn set_role(&self, id: Uuid, role: UserRole) -> Result<bool, ApiError> {
        let mut state = self.state();
        match state.users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                user.role = role;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> Result<(), ApiError> {
        let mut state = self.state();
        if let Some(user) = state.users.iter_mut().find(|u| u.id == id) {
            user.password_hash = password_hash.to_owned();
        }
        Ok(())
    }

    async fn set_reset_token_with_outbox(
        &self,
        id: Uuid,
        token_digest: &str,
        expires_at: DateTime<Utc>,
        event: &OutboxEvent,
    ) -> Result<(), ApiError> {
        let mut state = self.state();
        state
            .reset_tokens
            .insert(id, (token_digest.to_owned(), expires_at));
        state.outbox.push(event.clone());
        Ok(())
    }

    async fn find_by_reset_digest(
        &self,
        token_digest: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, ApiError> {
        let state = self.state();
        let holder = state
            .reset_tokens
            .iter()
            .find(|(_, (digest, expires_at))| digest == token_digest && *expires_at > now)
            .map(|(id, _)| *id);
        Ok(holder.and_then(|id| state.users.iter().find(|u| u.id == id).cloned()))
    }

    async fn complete_password_reset(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<(), ApiError> {
        let mut state = self.state();
        state.reset_tokens.remove(&id);
        if let Some(user) = state.users.iter_mut().find(|u| u.id == id) {
            user.password_hash = password_hash.to_owned();
        }
        Ok(())
    }

    async fn list_badges(&self, id: Uuid) -> Result<Vec<BadgeType>, ApiError> {
        Ok(self.badges_of(id))
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool, ApiError> {
        let mut state = self.state();
        let before = state.users.len();
        state.users.retain(|u| u.id != id);
        if state.users.len() == before {
            return Ok(false);
        }
        state.sessions.retain(|s| s.user_id != id);
        state.badges.retain(|(u, _)| *u != id);
        state.reset_tokens.remove(&id);
        state
            .exchanges
            .retain(|e| e.from_user_id != id && e.to_user_id != id);
        state.properties.retain(|p| p.owner_id != id);
        Ok(true)
    }
}

impl SessionRepository for MemoryStore {
    async fn admit(
        &self,
        session: &ActiveSession,
        max: u64,
    ) -> Result<SessionAdmission, ApiError> {
        let mut state = self.state();
        let count = state
            .sessions
            .iter()
            .filter(|s| s.user_id == session.user_id)
            .count() as u64;
        let owner = state
            .users
            .iter_mut()
            .find(|u| u.id == session.user_id)
            .ok_or(ApiError::UserNotFound)?;
        if owner.is_suspended {
            return Ok(SessionAdmission::AlreadySuspended {
                reason: owner.suspension_message(),
            });
        }
        if count >= max {
            let reason = session_limit_reason();
            owner.is_suspended = true;
            owner.suspension_reason = Some(reason.clone());
            return Ok(SessionAdmission::Suspended { reason });
        }
        state.sessions.push(session.clone());
        Ok(SessionAdmission::Admitted(session.clone()))
    }

    async fn find(
        &self,
        user_id: Uuid,
        session_token: &str,
    ) -> Result<Option<ActiveSession>, ApiError> {
        Ok(self
            .state()
            .sessions
            .iter()
            .find(|s| s.user_id == user_id && s.session_token == session_token)
            .cloned())
    }

    async fn touch(&self, session_id: Uuid, at: DateTime<Utc>) -> Result<(), ApiError> {
        let mut state = self.state();
        if let Some(session) = state.sessions.iter_mut().find(|s| s.id == session_id) {
            session.last_activity = at;
        }
        Ok(())
    }

    async fn delete(&self, user_id: Uuid, session_token: &str) -> Result<u64, ApiError> {
        let mut state = self.state();
        let before = state.sessions.len();
        state
            .sessions
            .retain(|s| !(s.user_id == user_id && s.session_token == session_token));
        Ok((before - state.sessions.len()) as u64)
    }

    async fn terminate_all(&self, user_id: Uuid) -> Result<u64, ApiError> {
        let mut state = self.state();
        let before = state.sessions.len();
        state.sessions.retain(|s| s.user_id != user_id);
        let rows = (before - state.sessions.len()) as u64;
        if let Some(user) = state.users.iter_mut().find(|u| u.id == user_id) {
            user.is_suspended = false;
            user.suspension_reason = None;
        }
        Ok(rows)
    }

    async fn delete_inactive_since(&self, cutoff: DateTime<Utc>) -> Result<u64, ApiError> {
        let mut state = self.state();
        let before = state.sessions.len();
        state.sessions.retain(|s| s.last_activity >= cutoff);
        Ok((before - state.sessions.len()) as u64)
    }
}

impl RegistrationRepository for MemoryStore {
    async fn email_claim(&self, email: &str) -> Result<EmailClaim, ApiError> {
        let state = self.state();
        if state.users.iter().any(|u| u.email == email) {
            Ok(EmailClaim::User)
        } else if state.pending.iter().any(|p| p.email == email) {
            Ok(EmailClaim::Pending)
        } else {
            Ok(EmailClaim::Free)
        }
    }

    async fn create_pending(&self, pending: &PendingUser) -> Result<(), ApiError> {
        let mut state = self.state();
        if state.pending.iter().any(|p| p.email == pending.email) {
            return Err(ApiError::EmailPendingVerification);
        }
        state.pending.push(pending.clone());
        Ok(())
    }

    async fn find_pending(&self, id: Uuid) -> Result<Option<PendingUser>, ApiError> {
        Ok(self.state().pending.iter().find(|p| p.id == id).cloned())
    }

    async fn issue_otp(
        &self,
        otp: &OtpVerification,
        event: &OutboxEvent,
    ) -> Result<(), ApiError> {
        let mut state = self.state();
        state.otps.push(otp.clone());
        state.outbox.push(event.clone());
        Ok(())
    }

    async fn latest_otp(
        &self,
        pending_user_id: Uuid,
        method: OtpMethod,
    ) -> Result<Option<OtpVerification>, ApiError> {
        Ok(self
            .state()
            .otps
            .iter()
            .filter(|o| o.pending_user_id == pending_user_id && o.method == method)
            .max_by_key(|o| o.created_at)
            .cloned())
    }

    async fn find_live_otp(
        &self,
        pending_user_id: Uuid,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<OtpVerification>, ApiError> {
        Ok(self
            .state()
            .otps
            .iter()
            .filter(|o| {
                o.pending_user_id == pending_user_id
                    && o.code == code
                    && o.verified_at.is_none()
                    && o.expires_at >= now
            })
            .max_by_key(|o| o.created_at)
            .cloned())
    }

    async fn complete(&self, completion: &Completion) -> Result<CompletionOutcome, ApiError> {
        let mut state = self.state();
        let now = Utc::now();

        let Some(otp) = state
            .otps
            .iter_mut()
            .find(|o| o.id == completion.otp_id && o.verified_at.is_none())
        else {
            return Err(ApiError::InvalidOtp);
        };
        otp.verified_at = Some(now);

        if state.users.iter().any(|u| u.email == completion.user.email) {
            return Err(ApiError::UserAlreadyExists);
        }
        state.users.push(completion.user.clone());

        let mut referrer_total = None;
        if let Some(credit) = completion.referral {
            if let Some(referrer) = state.users.iter_mut().find(|u| u.id == credit.referrer_id) {
                referrer.total_referrals += 1;
                referrer.balance += credit.reward;
                referrer_total = Some((referrer.id, referrer.total_referrals));
            }
        }

        state
            .otps
            .retain(|o| o.pending_user_id != completion.pending_user_id);
        state.pending.retain(|p| p.id != completion.pending_user_id);
        state.sessions.push(completion.session.clone());

        Ok(CompletionOutcome { referrer_total })
    }

    async fn delete_pending_before(&self, cutoff: DateTime<Utc>) -> Result<u64, ApiError> {
        let mut state = self.state();
        let stale: Vec<Uuid> = state
            .pending
            .iter()
            .filter(|p| p.created_at < cutoff)
            .map(|p| p.id)
            .collect();
        state.pending.retain(|p| !stale.contains(&p.id));
        state.otps.retain(|o| !stale.contains(&o.pending_user_id));
        Ok(stale.len() as u64)
    }
}

impl BadgeRepository for MemoryStore {
    async fn award(&self, user_id: Uuid, badge: BadgeType) -> Result<AwardOutcome, ApiError> {
        let mut state = self.state();
        if state.fail_badge_awards {
            return Err(anyhow::anyhow!("badge store unavailable").into());
        }
        if state.badges.contains(&(user_id, badge)) {
            return Ok(AwardOutcome::AlreadyHeld);
        }
        state.badges.push((user_id, badge));
        Ok(AwardOutcome::Awarded)
    }
}

impl ExchangeRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ExchangeRequest>, ApiError> {
        Ok(self.state().exchanges.iter().find(|e| e.id == id).cloned())
    }

    async fn commit_transition(
        &self,
        id: Uuid,
        from: ExchangeStatus,
        transition: &Transition,
    ) -> Result<Vec<TradeProgress>, ApiError> {
        let mut state = self.state();
        let current = state
            .exchanges
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.status)
            .ok_or(ApiError::ExchangeRequestNotFound)?;
        if current != from {
            return Err(ApiError::ExchangeNotPending);
        }

        let evaluated = transition.users_to_evaluate();
        let before: Vec<u64> = evaluated
            .iter()
            .map(|u| state.accepted_as_recipient(*u))
            .collect();

        if let Some(request) = state.exchanges.iter_mut().find(|e| e.id == id) {
            request.status = transition.next;
            request.updated_at = Utc::now();
        }
        for property_id in transition.properties_to_mark() {
            if let Some(p) = state.properties.iter_mut().find(|p| p.id == property_id) {
                p.is_exchanged = true;
            }
        }

        Ok(evaluated
            .iter()
            .zip(before)
            .map(|(user_id, before)| TradeProgress {
                user_id: *user_id,
                before,
                after: state.accepted_as_recipient(*user_id),
            })
            .collect())
    }

    async fn find_detail(&self, id: Uuid) -> Result<Option<ExchangeRequestDetail>, ApiError> {
        let state = self.state();
        let Some(request) = state.exchanges.iter().find(|e| e.id == id).cloned() else {
            return Ok(None);
        };
        let user = |uid: Uuid| state.users.iter().find(|u| u.id == uid).map(UserSummary::from);
        let property = |pid: Uuid| state.properties.iter().find(|p| p.id == pid).cloned();
        Ok(Some(ExchangeRequestDetail {
            from_user: user(request.from_user_id).ok_or(ApiError::UserNotFound)?,
            to_user: user(request.to_user_id).ok_or(ApiError::UserNotFound)?,
            from_property: property(request.from_property_id)
                .ok_or(ApiError::ExchangeRequestNotFound)?,
            to_property: property(request.to_property_id)
                .ok_or(ApiError::ExchangeRequestNotFound)?,
            request,
        }))
    }
}
