use std::net::SocketAddr;

use axum::{
    Json,
    extract::{ConnectInfo, FromRequestParts, State},
    http::{StatusCode, request::Parts},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::domain::types::UNKNOWN_IP;
use crate::error::ApiError;
use crate::handlers::users::UserResponse;
use crate::handlers::validate;
use crate::state::AppState;
use crate::usecase::authenticate::AuthContext;
use crate::usecase::registration::{
    RegisterInput, RegisterUseCase, ResendOtpUseCase, SendOtpInput, SendOtpUseCase,
    VerifyOtpInput, VerifyOtpUseCase,
};
use crate::usecase::session::{
    LoginInput, LoginUseCase, LogoutUseCase, ResetSessionsInput, ResetSessionsUseCase,
};

type Message = Json<serde_json::Value>;

fn message(text: &str) -> Message {
    Json(json!({ "message": text }))
}

/// Client address: the peer socket when known, else the first
/// `x-forwarded-for` hop, else `"Unknown"`.
pub struct ClientIp(pub String);

impl<S: Send + Sync> FromRequestParts<S> for ClientIp {
    type Rejection = std::convert::Infallible;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());
        let forwarded = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty());
        let ip = peer
            .or(forwarded)
            .unwrap_or_else(|| UNKNOWN_IP.to_owned());

        async move { Ok(Self(ip)) }
    }
}

// ── POST /auth/register ──────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub phone_number: Option<String>,
    pub referral_code: Option<String>,
}

impl RegisterRequest {
    fn validate(self) -> Result<RegisterInput, ApiError> {
        Ok(RegisterInput {
            first_name: validate::required("firstName", self.first_name)?,
            last_name: validate::required("lastName", self.last_name)?,
            email: validate::email(self.email)?,
            password: validate::password(self.password)?,
            phone_number: validate::optional(self.phone_number),
            referral_code: validate::optional(self.referral_code),
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub user_id: Uuid,
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let input = body.validate()?;
    let usecase = RegisterUseCase {
        registrations: state.registration_repo(),
    };
    let out = usecase.execute(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            status: "pending",
            message: "Registration successful. Please verify your account via OTP.",
            user_id: out.pending_user_id,
        }),
    ))
}

// ── POST /auth/send-otp, /auth/resend-otp ────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct SendOtpRequest {
    pub user_id: String,
    pub method: String,
}

impl SendOtpRequest {
    fn validate(self) -> Result<SendOtpInput, ApiError> {
        Ok(SendOtpInput {
            pending_user_id: validate::id("userId", &self.user_id)?,
            method: validate::otp_method(&self.method)?,
        })
    }
}

pub async fn send_otp(
    State(state): State<AppState>,
    Json(body): Json<SendOtpRequest>,
) -> Result<Message, ApiError> {
    let input = body.validate()?;
    let usecase = SendOtpUseCase {
        registrations: state.registration_repo(),
    };
    usecase.execute(input).await?;
    Ok(message("OTP sent successfully"))
}

pub async fn resend_otp(
    State(state): State<AppState>,
    Json(body): Json<SendOtpRequest>,
) -> Result<Message, ApiError> {
    let input = body.validate()?;
    let usecase = ResendOtpUseCase {
        registrations: state.registration_repo(),
    };
    usecase.execute(input).await?;
    Ok(message("OTP sent successfully"))
}

// ── POST /auth/verify-otp ────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct VerifyOtpRequest {
    pub user_id: String,
    pub otp: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub user: UserResponse,
    pub access_token: String,
}

pub async fn verify_otp(
    State(state): State<AppState>,
    ClientIp(ip_address): ClientIp,
    Json(body): Json<VerifyOtpRequest>,
) -> Result<Json<VerifyOtpResponse>, ApiError> {
    let input = VerifyOtpInput {
        pending_user_id: validate::id("userId", &body.user_id)?,
        code: validate::otp_code(body.otp)?,
        ip_address,
    };
    let usecase = VerifyOtpUseCase {
        users: state.user_repo(),
        registrations: state.registration_repo(),
        badges: state.badge_repo(),
        tokens: state.token_issuer(),
    };
    let out = usecase.execute(input).await?;
    Ok(Json(VerifyOtpResponse {
        status: "verified",
        message: "OTP verified successfully. User registered.",
        user: out.user.into(),
        access_token: out.access_token,
    }))
}

// ── POST /auth/login ─────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: UserResponse,
    pub access_token: String,
}

pub async fn login(
    State(state): State<AppState>,
    ClientIp(ip_address): ClientIp,
    Json(body): Json<CredentialsRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let usecase = LoginUseCase {
        users: state.user_repo(),
        sessions: state.session_repo(),
        tokens: state.token_issuer(),
    };
    let out = usecase
        .execute(LoginInput {
            email: body.email.trim().to_owned(),
            password: body.password,
            ip_address,
        })
        .await?;
    Ok(Json(LoginResponse {
        user: out.user.into(),
        access_token: out.access_token,
    }))
}

// ── POST /auth/logout ────────────────────────────────────────────────────────

pub async fn logout(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Message, ApiError> {
    let usecase = LogoutUseCase {
        sessions: state.session_repo(),
    };
    usecase.execute(auth.user.id, &auth.session_token).await?;
    Ok(message("Successfully logged out."))
}

// ── POST /auth/reset-sessions-and-suspension ─────────────────────────────────

pub async fn reset_sessions_and_suspension(
    State(state): State<AppState>,
    Json(body): Json<CredentialsRequest>,
) -> Result<Message, ApiError> {
    let usecase = ResetSessionsUseCase {
        users: state.user_repo(),
        sessions: state.session_repo(),
    };
    usecase
        .execute(ResetSessionsInput {
            email: body.email.trim().to_owned(),
            password: body.password,
        })
        .await?;
    Ok(message(
        "All your active sessions have been terminated, and your account has been unsuspended. Please proceed to log in now.",
    ))
}
