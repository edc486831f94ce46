use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, SqlErr,
    TransactionError, TransactionTrait,
};
use uuid::Uuid;

use homeswap_api_schema::{
    active_sessions, badges, exchange_requests, otp_verifications, outbox_events, pending_users,
    properties, user_badges, users,
};
use homeswap_domain::badge::BadgeType;
use homeswap_domain::exchange::{ExchangeStatus, Transition};
use homeswap_domain::otp::OtpMethod;
use homeswap_domain::user::UserRole;

use crate::domain::registration::{Completion, CompletionOutcome};
use crate::domain::repository::{
    BadgeRepository, ExchangeRepository, RegistrationRepository, SessionRepository,
    UserRepository,
};
use crate::domain::types::{
    ActiveSession, AwardOutcome, EmailClaim, ExchangeRequest, ExchangeRequestDetail,
    OtpVerification, OutboxEvent, PendingUser, Property, SessionAdmission, TradeProgress, User,
    UserSummary, session_limit_reason,
};
use crate::error::ApiError;

fn txn_error(e: TransactionError<ApiError>) -> ApiError {
    match e {
        TransactionError::Connection(db) => {
            ApiError::Internal(anyhow::Error::new(db).context("begin transaction"))
        }
        TransactionError::Transaction(e) => e,
    }
}

fn is_unique_violation(e: &DbErr) -> bool {
    matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        model.map(user_from_model).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find user by email")?;
        model.map(user_from_model).transpose()
    }

    async fn find_by_referral_code(&self, code: &str) -> Result<Option<User>, ApiError> {
        let model = users::Entity::find()
            .filter(users::Column::ReferralCode.eq(code))
            .one(&self.db)
            .await
            .context("find user by referral code")?;
        model.map(user_from_model).transpose()
    }

    async fn referral_code_taken(&self, code: &str) -> Result<bool, ApiError> {
        let count = users::Entity::find()
            .filter(users::Column::ReferralCode.eq(code))
            .count(&self.db)
            .await
            .context("count referral code")?;
        Ok(count > 0)
    }

    async fn set_role(&self, id: Uuid, role: UserRole) -> Result<bool, ApiError> {
        let result = users::Entity::update_many()
            .col_expr(users::Column::Role, Expr::value(role.as_str()))
            .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(users::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .context("set user role")?;
        Ok(result.rows_affected > 0)
    }

    async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> Result<(), ApiError> {
        users::ActiveModel {
            id: Set(id),
            password_hash: Set(password_hash.to_owned()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("set password hash")?;
        Ok(())
    }

    async fn set_reset_token_with_outbox(
        &self,
        id: Uuid,
        token_digest: &str,
        expires_at: DateTime<Utc>,
        event: &OutboxEvent,
    ) -> Result<(), ApiError> {
        let token_digest = token_digest.to_owned();
        let event = event.clone();
        self.db
            .transaction::<_, (), DbErr>(|txn| {
                Box::pin(async move {
                    users::ActiveModel {
                        id: Set(id),
                        reset_token_hash: Set(Some(token_digest)),
                        reset_token_expires_at: Set(Some(expires_at)),
                        updated_at: Set(Utc::now()),
                        ..Default::default()
                    }
                    .update(txn)
                    .await?;
                    insert_outbox_event(txn, &event).await?;
                    Ok(())
                })
            })
            .await
            .context("store reset token with outbox")?;
        Ok(())
    }

    async fn find_by_reset_digest(
        &self,
        token_digest: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, ApiError> {
        let model = users::Entity::find()
            .filter(users::Column::ResetTokenHash.eq(token_digest))
            .filter(users::Column::ResetTokenExpiresAt.gte(now))
            .one(&self.db)
            .await
            .context("find user by reset digest")?;
        model.map(user_from_model).transpose()
    }

    async fn complete_password_reset(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<(), ApiError> {
        users::ActiveModel {
            id: Set(id),
            password_hash: Set(password_hash.to_owned()),
            reset_token_hash: Set(None),
            reset_token_expires_at: Set(None),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("complete password reset")?;
        Ok(())
    }

    async fn list_badges(&self, id: Uuid) -> Result<Vec<BadgeType>, ApiError> {
        let rows = user_badges::Entity::find()
            .filter(user_badges::Column::UserId.eq(id))
            .order_by_asc(user_badges::Column::AwardedAt)
            .find_also_related(badges::Entity)
            .all(&self.db)
            .await
            .context("list user badges")?;
        rows.into_iter()
            .filter_map(|(_, badge)| badge)
            .map(|badge| {
                badge
                    .badge_type
                    .parse::<BadgeType>()
                    .context("parse badge type")
                    .map_err(ApiError::from)
            })
            .collect()
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool, ApiError> {
        let result = users::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete user")?;
        Ok(result.rows_affected > 0)
    }
}

fn user_from_model(model: users::Model) -> Result<User, ApiError> {
    let role = model.role.parse::<UserRole>().context("parse user role")?;
    Ok(User {
        id: model.id,
        email: model.email,
        password_hash: model.password_hash,
        full_name: model.full_name,
        role,
        is_suspended: model.is_suspended,
        suspension_reason: model.suspension_reason,
        referral_code: model.referral_code,
        referred_by: model.referred_by,
        total_referrals: u32::try_from(model.total_referrals).unwrap_or_default(),
        balance: model.balance,
        created_at: model.created_at,
    })
}

// ── Session repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbSessionRepository {
    pub db: DatabaseConnection,
}

impl SessionRepository for DbSessionRepository {
    async fn admit(
        &self,
        session: &ActiveSession,
        max: u64,
    ) -> Result<SessionAdmission, ApiError> {
        let session = session.clone();
        self.db
            .transaction::<_, SessionAdmission, ApiError>(|txn| {
                Box::pin(async move {
                    // Row lock on the owner serializes concurrent admissions.
                    let owner = users::Entity::find_by_id(session.user_id)
                        .lock_exclusive()
                        .one(txn)
                        .await
                        .context("lock user for session admission")?
                        .ok_or(ApiError::UserNotFound)?;
                    let owner = user_from_model(owner)?;
                    if owner.is_suspended {
                        return Ok(SessionAdmission::AlreadySuspended {
                            reason: owner.suspension_message(),
                        });
                    }

                    let count = active_sessions::Entity::find()
                        .filter(active_sessions::Column::UserId.eq(owner.id))
                        .count(txn)
                        .await
                        .context("count sessions")?;
                    if count >= max {
                        let reason = session_limit_reason();
                        users::ActiveModel {
                            id: Set(owner.id),
                            is_suspended: Set(true),
                            suspension_reason: Set(Some(reason.clone())),
                            updated_at: Set(Utc::now()),
                            ..Default::default()
                        }
                        .update(txn)
                        .await
                        .context("suspend user")?;
                        return Ok(SessionAdmission::Suspended { reason });
                    }

                    insert_session(txn, &session)
                        .await
                        .context("insert session")?;
                    Ok(SessionAdmission::Admitted(session))
                })
            })
            .await
            .map_err(txn_error)
    }

    async fn find(
        &self,
        user_id: Uuid,
        session_token: &str,
    ) -> Result<Option<ActiveSession>, ApiError> {
        let model = active_sessions::Entity::find()
            .filter(active_sessions::Column::UserId.eq(user_id))
            .filter(active_sessions::Column::SessionToken.eq(session_token))
            .one(&self.db)
            .await
            .context("find session")?;
        Ok(model.map(session_from_model))
    }

    async fn touch(&self, session_id: Uuid, at: DateTime<Utc>) -> Result<(), ApiError> {
        active_sessions::Entity::update_many()
            .col_expr(active_sessions::Column::LastActivity, Expr::value(at))
            .filter(active_sessions::Column::Id.eq(session_id))
            .exec(&self.db)
            .await
            .context("touch session")?;
        Ok(())
    }

    async fn delete(&self, user_id: Uuid, session_token: &str) -> Result<u64, ApiError> {
        let result = active_sessions::Entity::delete_many()
            .filter(active_sessions::Column::UserId.eq(user_id))
            .filter(active_sessions::Column::SessionToken.eq(session_token))
            .exec(&self.db)
            .await
            .context("delete session")?;
        Ok(result.rows_affected)
    }

    async fn terminate_all(&self, user_id: Uuid) -> Result<u64, ApiError> {
        let rows = self
            .db
            .transaction::<_, u64, DbErr>(|txn| {
                Box::pin(async move {
                    let result = active_sessions::Entity::delete_many()
                        .filter(active_sessions::Column::UserId.eq(user_id))
                        .exec(txn)
                        .await?;
                    users::Entity::update_many()
                        .col_expr(users::Column::IsSuspended, Expr::value(false))
                        .col_expr(
                            users::Column::SuspensionReason,
                            Expr::value(Option::<String>::None),
                        )
                        .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()))
                        .filter(users::Column::Id.eq(user_id))
                        .exec(txn)
                        .await?;
                    Ok(result.rows_affected)
                })
            })
            .await
            .context("terminate all sessions")?;
        Ok(rows)
    }

    async fn delete_inactive_since(&self, cutoff: DateTime<Utc>) -> Result<u64, ApiError> {
        let result = active_sessions::Entity::delete_many()
            .filter(active_sessions::Column::LastActivity.lt(cutoff))
            .exec(&self.db)
            .await
            .context("delete inactive sessions")?;
        Ok(result.rows_affected)
    }
}

async fn insert_session(txn: &DatabaseTransaction, session: &ActiveSession) -> Result<(), DbErr> {
    active_sessions::ActiveModel {
        id: Set(session.id),
        user_id: Set(session.user_id),
        session_token: Set(session.session_token.clone()),
        ip_address: Set(session.ip_address.clone()),
        last_activity: Set(session.last_activity),
        created_at: Set(session.created_at),
    }
    .insert(txn)
    .await?;
    Ok(())
}

fn session_from_model(model: active_sessions::Model) -> ActiveSession {
    ActiveSession {
        id: model.id,
        user_id: model.user_id,
        session_token: model.session_token,
        ip_address: model.ip_address,
        last_activity: model.last_activity,
        created_at: model.created_at,
    }
}

// ── Registration repository ──────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbRegistrationRepository {
    pub db: DatabaseConnection,
}

impl RegistrationRepository for DbRegistrationRepository {
    async fn email_claim(&self, email: &str) -> Result<EmailClaim, ApiError> {
        let verified = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .count(&self.db)
            .await
            .context("count users by email")?;
        if verified > 0 {
            return Ok(EmailClaim::User);
        }
        let pending = pending_users::Entity::find()
            .filter(pending_users::Column::Email.eq(email))
            .count(&self.db)
            .await
            .context("count pending users by email")?;
        if pending > 0 {
            return Ok(EmailClaim::Pending);
        }
        Ok(EmailClaim::Free)
    }

    async fn create_pending(&self, pending: &PendingUser) -> Result<(), ApiError> {
        let result = pending_users::ActiveModel {
            id: Set(pending.id),
            email: Set(pending.email.clone()),
            password_hash: Set(pending.password_hash.clone()),
            full_name: Set(pending.full_name.clone()),
            phone_number: Set(pending.phone_number.clone()),
            referral_code: Set(pending.referral_code.clone()),
            role: Set(pending.role.as_str().to_owned()),
            created_at: Set(pending.created_at),
        }
        .insert(&self.db)
        .await;
        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(ApiError::EmailPendingVerification),
            Err(e) => Err(anyhow::Error::new(e).context("create pending user").into()),
        }
    }

    async fn find_pending(&self, id: Uuid) -> Result<Option<PendingUser>, ApiError> {
        let model = pending_users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find pending user")?;
        model.map(pending_from_model).transpose()
    }

    async fn issue_otp(
        &self,
        otp: &OtpVerification,
        event: &OutboxEvent,
    ) -> Result<(), ApiError> {
        let otp = otp.clone();
        let event = event.clone();
        self.db
            .transaction::<_, (), DbErr>(|txn| {
                Box::pin(async move {
                    otp_verifications::ActiveModel {
                        id: Set(otp.id),
                        pending_user_id: Set(otp.pending_user_id),
                        code: Set(otp.code.clone()),
                        method: Set(otp.method.as_str().to_owned()),
                        expires_at: Set(otp.expires_at),
                        verified_at: Set(None),
                        created_at: Set(otp.created_at),
                    }
                    .insert(txn)
                    .await?;
                    insert_outbox_event(txn, &event).await?;
                    Ok(())
                })
            })
            .await
            .context("issue otp with outbox")?;
        Ok(())
    }

    async fn latest_otp(
        &self,
        pending_user_id: Uuid,
        method: OtpMethod,
    ) -> Result<Option<OtpVerification>, ApiError> {
        let model = otp_verifications::Entity::find()
            .filter(otp_verifications::Column::PendingUserId.eq(pending_user_id))
            .filter(otp_verifications::Column::Method.eq(method.as_str()))
            .order_by_desc(otp_verifications::Column::CreatedAt)
            .one(&self.db)
            .await
            .context("find latest otp")?;
        model.map(otp_from_model).transpose()
    }

    async fn find_live_otp(
        &self,
        pending_user_id: Uuid,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<OtpVerification>, ApiError> {
        let model = otp_verifications::Entity::find()
            .filter(otp_verifications::Column::PendingUserId.eq(pending_user_id))
            .filter(otp_verifications::Column::Code.eq(code))
            .filter(otp_verifications::Column::VerifiedAt.is_null())
            .filter(otp_verifications::Column::ExpiresAt.gte(now))
            .order_by_desc(otp_verifications::Column::CreatedAt)
            .one(&self.db)
            .await
            .context("find live otp")?;
        model.map(otp_from_model).transpose()
    }

    async fn complete(&self, completion: &Completion) -> Result<CompletionOutcome, ApiError> {
        let completion = completion.clone();
        self.db
            .transaction::<_, CompletionOutcome, ApiError>(|txn| {
                Box::pin(async move {
                    let now = Utc::now();

                    // 1. Consume the OTP; losing a race to another verifier fails here.
                    let consumed = otp_verifications::Entity::update_many()
                        .col_expr(otp_verifications::Column::VerifiedAt, Expr::value(now))
                        .filter(otp_verifications::Column::Id.eq(completion.otp_id))
                        .filter(otp_verifications::Column::VerifiedAt.is_null())
                        .exec(txn)
                        .await
                        .context("consume otp")?;
                    if consumed.rows_affected == 0 {
                        return Err(ApiError::InvalidOtp);
                    }

                    // 2. A user with this email may have appeared since registration.
                    let existing = users::Entity::find()
                        .filter(users::Column::Email.eq(completion.user.email.as_str()))
                        .count(txn)
                        .await
                        .context("check user email")?;
                    if existing > 0 {
                        return Err(ApiError::UserAlreadyExists);
                    }

                    // 3. Create the user.
                    match user_active_model(&completion.user, now).insert(txn).await {
                        Ok(_) => {}
                        Err(e) if is_unique_violation(&e) => {
                            return Err(ApiError::UserAlreadyExists);
                        }
                        Err(e) => return Err(anyhow::Error::new(e).context("insert user").into()),
                    }

                    // 4. Credit the referrer.
                    let mut referrer_total = None;
                    if let Some(credit) = completion.referral {
                        let referrer = users::Entity::find_by_id(credit.referrer_id)
                            .lock_exclusive()
                            .one(txn)
                            .await
                            .context("lock referrer")?;
                        if let Some(referrer) = referrer {
                            let total = referrer.total_referrals + 1;
                            users::ActiveModel {
                                id: Set(referrer.id),
                                total_referrals: Set(total),
                                balance: Set(referrer.balance + credit.reward),
                                updated_at: Set(now),
                                ..Default::default()
                            }
                            .update(txn)
                            .await
                            .context("credit referrer")?;
                            referrer_total =
                                Some((referrer.id, u32::try_from(total).unwrap_or_default()));
                        }
                    }

                    // 5. Purge OTPs and the pending row.
                    otp_verifications::Entity::delete_many()
                        .filter(
                            otp_verifications::Column::PendingUserId
                                .eq(completion.pending_user_id),
                        )
                        .exec(txn)
                        .await
                        .context("purge otps")?;
                    pending_users::Entity::delete_by_id(completion.pending_user_id)
                        .exec(txn)
                        .await
                        .context("delete pending user")?;

                    // 6. First session; no cap applies to a brand-new user.
                    insert_session(txn, &completion.session)
                        .await
                        .context("insert first session")?;

                    Ok(CompletionOutcome { referrer_total })
                })
            })
            .await
            .map_err(txn_error)
    }

    async fn delete_pending_before(&self, cutoff: DateTime<Utc>) -> Result<u64, ApiError> {
        // OTP rows go with their pending user (ON DELETE CASCADE).
        let result = pending_users::Entity::delete_many()
            .filter(pending_users::Column::CreatedAt.lt(cutoff))
            .exec(&self.db)
            .await
            .context("delete stale pending users")?;
        Ok(result.rows_affected)
    }
}

fn user_active_model(user: &User, now: DateTime<Utc>) -> users::ActiveModel {
    users::ActiveModel {
        id: Set(user.id),
        email: Set(user.email.clone()),
        password_hash: Set(user.password_hash.clone()),
        full_name: Set(user.full_name.clone()),
        role: Set(user.role.as_str().to_owned()),
        is_suspended: Set(user.is_suspended),
        suspension_reason: Set(user.suspension_reason.clone()),
        referral_code: Set(user.referral_code.clone()),
        referred_by: Set(user.referred_by.clone()),
        total_referrals: Set(i32::try_from(user.total_referrals).unwrap_or(i32::MAX)),
        balance: Set(user.balance),
        reset_token_hash: Set(None),
        reset_token_expires_at: Set(None),
        created_at: Set(user.created_at),
        updated_at: Set(now),
    }
}

fn pending_from_model(model: pending_users::Model) -> Result<PendingUser, ApiError> {
    let role = model
        .role
        .parse::<UserRole>()
        .context("parse pending user role")?;
    Ok(PendingUser {
        id: model.id,
        email: model.email,
        password_hash: model.password_hash,
        full_name: model.full_name,
        phone_number: model.phone_number,
        referral_code: model.referral_code,
        role,
        created_at: model.created_at,
    })
}

fn otp_from_model(model: otp_verifications::Model) -> Result<OtpVerification, ApiError> {
    let method = model
        .method
        .parse::<OtpMethod>()
        .context("parse otp method")?;
    Ok(OtpVerification {
        id: model.id,
        pending_user_id: model.pending_user_id,
        code: model.code,
        method,
        expires_at: model.expires_at,
        verified_at: model.verified_at,
        created_at: model.created_at,
    })
}

// ── Badge repository ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbBadgeRepository {
    pub db: DatabaseConnection,
}

impl BadgeRepository for DbBadgeRepository {
    async fn award(&self, user_id: Uuid, badge: BadgeType) -> Result<AwardOutcome, ApiError> {
        let catalog = badges::Entity::find()
            .filter(badges::Column::BadgeType.eq(badge.as_str()))
            .one(&self.db)
            .await
            .context("find badge")?
            .with_context(|| format!("badge {badge} missing from catalog"))?;

        // The composite key turns a repeat award into a no-op insert.
        let inserted = user_badges::Entity::insert(user_badges::ActiveModel {
            user_id: Set(user_id),
            badge_id: Set(catalog.id),
            awarded_at: Set(Utc::now()),
        })
        .on_conflict(
            OnConflict::columns([user_badges::Column::UserId, user_badges::Column::BadgeId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(&self.db)
        .await
        .context("award badge")?;

        Ok(if inserted == 0 {
            AwardOutcome::AlreadyHeld
        } else {
            AwardOutcome::Awarded
        })
    }
}

// ── Exchange repository ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbExchangeRepository {
    pub db: DatabaseConnection,
}

impl ExchangeRepository for DbExchangeRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ExchangeRequest>, ApiError> {
        let model = exchange_requests::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find exchange request")?;
        model.map(exchange_from_model).transpose()
    }

    async fn commit_transition(
        &self,
        id: Uuid,
        from: ExchangeStatus,
        transition: &Transition,
    ) -> Result<Vec<TradeProgress>, ApiError> {
        let transition = transition.clone();
        self.db
            .transaction::<_, Vec<TradeProgress>, ApiError>(|txn| {
                Box::pin(async move {
                    let row = exchange_requests::Entity::find_by_id(id)
                        .lock_exclusive()
                        .one(txn)
                        .await
                        .context("lock exchange request")?
                        .ok_or(ApiError::ExchangeRequestNotFound)?;
                    if row.status != from.as_str() {
                        return Err(ApiError::ExchangeNotPending);
                    }

                    let parties = transition.users_to_evaluate();
                    let mut before = Vec::with_capacity(parties.len());
                    for user_id in &parties {
                        before.push(count_accepted_as_recipient(txn, *user_id).await?);
                    }

                    let now = Utc::now();
                    exchange_requests::ActiveModel {
                        id: Set(id),
                        status: Set(transition.next.as_str().to_owned()),
                        updated_at: Set(now),
                        ..Default::default()
                    }
                    .update(txn)
                    .await
                    .context("update exchange status")?;

                    for property_id in transition.properties_to_mark() {
                        properties::Entity::update_many()
                            .col_expr(properties::Column::IsExchanged, Expr::value(true))
                            .col_expr(properties::Column::UpdatedAt, Expr::value(now))
                            .filter(properties::Column::Id.eq(property_id))
                            .exec(txn)
                            .await
                            .context("mark property exchanged")?;
                    }

                    let mut progress = Vec::with_capacity(parties.len());
                    for (user_id, before) in parties.into_iter().zip(before) {
                        let after = count_accepted_as_recipient(txn, user_id).await?;
                        progress.push(TradeProgress {
                            user_id,
                            before,
                            after,
                        });
                    }
                    Ok(progress)
                })
            })
            .await
            .map_err(txn_error)
    }

    async fn find_detail(&self, id: Uuid) -> Result<Option<ExchangeRequestDetail>, ApiError> {
        let Some(request) = self.find_by_id(id).await? else {
            return Ok(None);
        };
        let from_user = self.load_summary(request.from_user_id).await?;
        let to_user = self.load_summary(request.to_user_id).await?;
        let from_property = self.load_property(request.from_property_id).await?;
        let to_property = self.load_property(request.to_property_id).await?;
        Ok(Some(ExchangeRequestDetail {
            request,
            from_user,
            to_user,
            from_property,
            to_property,
        }))
    }
}

impl DbExchangeRepository {
    async fn load_summary(&self, id: Uuid) -> Result<UserSummary, ApiError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("load exchange party")?
            .with_context(|| format!("exchange party {id} missing"))?;
        Ok(UserSummary::from(&user_from_model(model)?))
    }

    async fn load_property(&self, id: Uuid) -> Result<Property, ApiError> {
        let model = properties::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("load exchange property")?
            .with_context(|| format!("exchange property {id} missing"))?;
        Ok(Property {
            id: model.id,
            owner_id: model.owner_id,
            title: model.title,
            is_exchanged: model.is_exchanged,
        })
    }
}

/// Accepted requests where `user_id` is the recipient.
async fn count_accepted_as_recipient(
    txn: &DatabaseTransaction,
    user_id: Uuid,
) -> Result<u64, ApiError> {
    let count = exchange_requests::Entity::find()
        .filter(exchange_requests::Column::ToUserId.eq(user_id))
        .filter(exchange_requests::Column::Status.eq(ExchangeStatus::Accepted.as_str()))
        .count(txn)
        .await
        .context("count accepted exchanges")?;
    Ok(count)
}

fn exchange_from_model(model: exchange_requests::Model) -> Result<ExchangeRequest, ApiError> {
    let status = model
        .status
        .parse::<ExchangeStatus>()
        .context("parse exchange status")?;
    Ok(ExchangeRequest {
        id: model.id,
        message: model.message,
        status,
        from_user_id: model.from_user_id,
        to_user_id: model.to_user_id,
        from_property_id: model.from_property_id,
        to_property_id: model.to_property_id,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

// ── Outbox ───────────────────────────────────────────────────────────────────

async fn insert_outbox_event(
    txn: &DatabaseTransaction,
    event: &OutboxEvent,
) -> Result<(), DbErr> {
    let now = Utc::now();
    outbox_events::ActiveModel {
        id: Set(event.id),
        kind: Set(event.kind.clone()),
        channel: Set(event.channel.as_str().to_owned()),
        recipient: Set(event.recipient.clone()),
        payload: Set(event.payload.clone()),
        idempotency_key: Set(event.idempotency_key.clone()),
        attempts: Set(0),
        last_error: Set(None),
        created_at: Set(now),
        next_attempt_at: Set(now),
        processed_at: Set(None),
        failed_at: Set(None),
    }
    .insert(txn)
    .await?;
    Ok(())
}
