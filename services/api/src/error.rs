use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// API domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    // 401
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("missing or invalid token")]
    MissingToken,
    #[error("invalid or expired token")]
    InvalidToken,
    #[error("user not found")]
    TokenSubjectNotFound,
    #[error("session terminated")]
    SessionTerminated,

    // 403
    #[error("account suspended: {0}")]
    AccountSuspended(String),
    #[error("insufficient role")]
    Forbidden,
    #[error("invalid credentials")]
    RecoveryDenied,

    // 404
    #[error("pending user not found")]
    PendingUserNotFound,
    #[error("user not found")]
    UserNotFound,
    #[error("exchange request not found")]
    ExchangeRequestNotFound,

    // 409
    #[error("email already in use")]
    EmailInUse,
    #[error("email is pending verification")]
    EmailPendingVerification,
    #[error("user already exists")]
    UserAlreadyExists,
    #[error("exchange request is not pending")]
    ExchangeNotPending,

    // 422
    #[error("invalid or expired OTP")]
    InvalidOtp,
    #[error("invalid or expired reset token")]
    InvalidResetToken,
    #[error("{0}")]
    Validation(String),

    // 429
    #[error("please wait {retry_after_secs} seconds before requesting another OTP")]
    OtpResendTooSoon { retry_after_secs: i64 },

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::MissingToken => "MISSING_TOKEN",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::TokenSubjectNotFound => "TOKEN_SUBJECT_NOT_FOUND",
            Self::SessionTerminated => "SESSION_TERMINATED",
            Self::AccountSuspended(_) => "ACCOUNT_SUSPENDED",
            Self::Forbidden => "FORBIDDEN",
            Self::RecoveryDenied => "RECOVERY_DENIED",
            Self::PendingUserNotFound => "PENDING_USER_NOT_FOUND",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::ExchangeRequestNotFound => "EXCHANGE_REQUEST_NOT_FOUND",
            Self::EmailInUse => "EMAIL_IN_USE",
            Self::EmailPendingVerification => "EMAIL_PENDING_VERIFICATION",
            Self::UserAlreadyExists => "USER_ALREADY_EXISTS",
            Self::ExchangeNotPending => "EXCHANGE_NOT_PENDING",
            Self::InvalidOtp => "INVALID_OTP",
            Self::InvalidResetToken => "INVALID_RESET_TOKEN",
            Self::Validation(_) => "VALIDATION",
            Self::OtpResendTooSoon { .. } => "OTP_RESEND_TOO_SOON",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidCredentials
            | Self::MissingToken
            | Self::InvalidToken
            | Self::TokenSubjectNotFound
            | Self::SessionTerminated => StatusCode::UNAUTHORIZED,
            Self::AccountSuspended(_) | Self::Forbidden | Self::RecoveryDenied => {
                StatusCode::FORBIDDEN
            }
            Self::PendingUserNotFound | Self::UserNotFound | Self::ExchangeRequestNotFound => {
                StatusCode::NOT_FOUND
            }
            Self::EmailInUse
            | Self::EmailPendingVerification
            | Self::UserAlreadyExists
            | Self::ExchangeNotPending => StatusCode::CONFLICT,
            Self::InvalidOtp | Self::InvalidResetToken | Self::Validation(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::OtpResendTooSoon { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        // TraceLayer already records every response status; only 500s carry a
        // cause worth logging here.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = ?e, kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
