use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;
use crate::handlers::validate;
use crate::state::AppState;
use crate::usecase::account::{
    ChangePasswordInput, ChangePasswordUseCase, ForgotPasswordUseCase, ResetPasswordInput,
    ResetPasswordUseCase,
};
use crate::usecase::authenticate::AuthContext;

// ── POST /auth/forgot-password ───────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

pub async fn forgot_password(
    State(state): State<AppState>,
    Json(body): Json<ForgotPasswordRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let email = validate::email(body.email)?;
    let usecase = ForgotPasswordUseCase {
        users: state.user_repo(),
    };
    usecase.execute(&email).await?;
    Ok(Json(json!({ "message": "Reset email sent" })))
}

// ── POST /auth/reset-password ────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

pub async fn reset_password(
    State(state): State<AppState>,
    Json(body): Json<ResetPasswordRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let usecase = ResetPasswordUseCase {
        users: state.user_repo(),
    };
    usecase
        .execute(ResetPasswordInput {
            token: validate::required("token", body.token)?,
            new_password: body.new_password,
        })
        .await?;
    Ok(Json(json!({ "message": "Password reset successfully" })))
}

// ── PATCH /auth/change-password ──────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let usecase = ChangePasswordUseCase {
        users: state.user_repo(),
    };
    usecase
        .execute(
            &auth.user,
            ChangePasswordInput {
                current_password: body.current_password,
                new_password: body.new_password,
            },
        )
        .await?;
    Ok(Json(json!({ "message": "Password changed successfully" })))
}
