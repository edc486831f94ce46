//! Bearer access-token codec.
//!
//! The token is a signed (not encrypted) HS256 JWT. Possession of a valid
//! token is necessary but not sufficient: the embedded `sessionToken` must
//! still match a live session row, which the service checks on every request.

use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::Deserialize;
#[cfg(any(feature = "ISSUER", test))]
use serde::Serialize;
use uuid::Uuid;

use homeswap_domain::user::UserRole;

/// Access-token lifetime in seconds (1 day).
pub const ACCESS_TOKEN_EXP: u64 = 86_400;

/// Identity extracted from a validated access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenInfo {
    pub user_id: Uuid,
    pub email: String,
    pub role: UserRole,
    pub session_token: String,
    pub exp: u64,
}

/// Errors returned by [`validate_access_token`].
///
/// Callers on the request path must not reveal which variant occurred.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
}

/// JWT claims payload.
///
/// | Field | JSON key | Meaning |
/// |-------|----------|---------|
/// | `id` | `id` | user ID (UUID string) |
/// | `email` | `email` | user email at issuance |
/// | `role` | `role` | [`UserRole`] wire value |
/// | `session_token` | `sessionToken` | opaque active-session token |
/// | `exp` | `exp` | expiration, seconds since UNIX epoch |
///
/// [`Serialize`] requires the **`ISSUER`** cargo feature; only the service
/// that creates sessions signs tokens.
#[derive(Debug, Deserialize)]
#[cfg_attr(any(feature = "ISSUER", test), derive(Serialize))]
pub struct AccessClaims {
    pub id: String,
    pub email: String,
    pub role: UserRole,
    #[serde(rename = "sessionToken")]
    pub session_token: String,
    pub exp: u64,
}

fn decode_jwt(token: &str, secret: &str) -> Result<AccessClaims, TokenError> {
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.validate_exp = true;
    validation.required_spec_claims.clear();
    validation.set_required_spec_claims(&["exp"]);

    let data = decode::<AccessClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::InvalidSignature,
        _ => TokenError::Malformed,
    })?;

    Ok(data.claims)
}

/// Verify signature and expiry, returning the embedded identity.
pub fn validate_access_token(token: &str, secret: &str) -> Result<TokenInfo, TokenError> {
    let claims = decode_jwt(token, secret)?;
    let user_id = claims
        .id
        .parse::<Uuid>()
        .map_err(|_| TokenError::Malformed)?;
    Ok(TokenInfo {
        user_id,
        email: claims.email,
        role: claims.role,
        session_token: claims.session_token,
        exp: claims.exp,
    })
}

/// Sign an access token for a session. Returns the token and its `exp`.
#[cfg(any(feature = "ISSUER", test))]
pub fn sign_access_token(
    user_id: Uuid,
    email: &str,
    role: UserRole,
    session_token: &str,
    ttl_secs: u64,
    secret: &str,
) -> Result<(String, u64), jsonwebtoken::errors::Error> {
    use jsonwebtoken::{EncodingKey, Header, encode};

    let exp = now_secs() + ttl_secs;
    let claims = AccessClaims {
        id: user_id.to_string(),
        email: email.to_owned(),
        role,
        session_token: session_token.to_owned(),
        exp,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok((token, exp))
}

#[cfg(any(feature = "ISSUER", test))]
fn now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
