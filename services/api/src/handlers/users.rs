use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use homeswap_domain::badge::BadgeType;
use homeswap_domain::user::UserRole;

use crate::domain::types::{AwardOutcome, User};
use crate::error::ApiError;
use crate::state::AppState;
use crate::usecase::account::{DeleteUserUseCase, GetProfileUseCase, UpdateRoleUseCase};
use crate::usecase::authenticate::AuthContext;
use crate::usecase::badge::AwardBadgeUseCase;

/// User as returned to clients. Never carries the password hash.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: UserRole,
    pub is_suspended: bool,
    pub suspension_reason: Option<String>,
    pub referral_code: Option<String>,
    pub referred_by: Option<String>,
    pub total_referrals: u32,
    pub balance: i64,
    #[serde(serialize_with = "homeswap_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            role: user.role,
            is_suspended: user.is_suspended,
            suspension_reason: user.suspension_reason,
            referral_code: user.referral_code,
            referred_by: user.referred_by,
            total_referrals: user.total_referrals,
            balance: user.balance,
            created_at: user.created_at,
        }
    }
}

// ── GET /users/me ────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub badges: Vec<BadgeType>,
}

pub async fn get_me(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<ProfileResponse>, ApiError> {
    let usecase = GetProfileUseCase {
        users: state.user_repo(),
    };
    let profile = usecase.execute(auth.user).await?;
    Ok(Json(ProfileResponse {
        user: profile.user.into(),
        badges: profile.badges,
    }))
}

// ── PATCH /users/{id}/role ───────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateRoleRequest {
    pub role: String,
}

pub async fn update_role(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(user_id): Path<Uuid>,
    Json(body): Json<UpdateRoleRequest>,
) -> Result<StatusCode, ApiError> {
    let role = body
        .role
        .parse::<UserRole>()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let usecase = UpdateRoleUseCase {
        users: state.user_repo(),
    };
    usecase.execute(&auth.user, user_id, role).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── PATCH /users/{id}/badges ─────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct AwardBadgeRequest {
    pub badge: String,
}

#[derive(Serialize)]
pub struct AwardBadgeResponse {
    pub badge: BadgeType,
    pub awarded: bool,
}

pub async fn award_badge(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(user_id): Path<Uuid>,
    Json(body): Json<AwardBadgeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let badge = body
        .badge
        .parse::<BadgeType>()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let usecase = AwardBadgeUseCase {
        users: state.user_repo(),
        badges: state.badge_repo(),
    };
    let outcome = usecase.execute(&auth.user, user_id, badge).await?;
    Ok(Json(AwardBadgeResponse {
        badge,
        awarded: outcome == AwardOutcome::Awarded,
    }))
}

// ── DELETE /users/{id} ───────────────────────────────────────────────────────

pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(user_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let usecase = DeleteUserUseCase {
        users: state.user_repo(),
    };
    usecase.execute(&auth.user, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
