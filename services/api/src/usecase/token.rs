use rand::RngExt;

use homeswap_auth_types::token::sign_access_token;

use crate::domain::types::User;
use crate::error::ApiError;

/// Opaque session token: 16 random bytes, hex encoded.
pub fn generate_session_token() -> String {
    let bytes: [u8; 16] = rand::rng().random();
    hex::encode(bytes)
}

/// Signs bearer tokens for freshly opened sessions.
#[derive(Clone)]
pub struct TokenIssuer {
    pub jwt_secret: String,
    pub ttl_secs: u64,
}

impl TokenIssuer {
    /// Returns the token and its `exp`.
    pub fn issue(&self, user: &User, session_token: &str) -> Result<(String, u64), ApiError> {
        sign_access_token(
            user.id,
            &user.email,
            user.role,
            session_token,
            self.ttl_secs,
            &self.jwt_secret,
        )
        .map_err(|e| ApiError::Internal(e.into()))
    }
}
