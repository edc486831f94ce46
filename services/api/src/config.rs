use std::str::FromStr;

use anyhow::{Context as _, bail};

/// Upper bound on `PENDING_USER_TTL_HOURS`: ten years.
pub const MAX_PENDING_USER_TTL_HOURS: u64 = 24 * 365 * 10;

/// API service configuration loaded from environment variables.
#[derive(Debug)]
pub struct ApiConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// HMAC secret for signing bearer access tokens.
    pub jwt_secret: String,
    /// TCP port to listen on (default 3110). Env var: `API_PORT`.
    pub api_port: u16,
    /// Access-token lifetime (default 1 day). Env var: `ACCESS_TOKEN_TTL_SECS`.
    pub access_token_ttl_secs: u64,
    /// Period of the inactive-session sweep (default 1 day, never zero).
    /// Env var: `SESSION_CLEANUP_INTERVAL_SECS`.
    pub session_cleanup_interval_secs: u64,
    /// Age after which unverified registrations are deleted. Unset disables
    /// the sweep. Env var: `PENDING_USER_TTL_HOURS`.
    pub pending_user_ttl_hours: Option<u64>,
    /// Credentials seeded as SUPER_ADMIN at startup when both are set.
    /// Env vars: `SUPER_ADMIN_EMAIL`, `SUPER_ADMIN_PASSWORD`.
    pub super_admin: Option<SuperAdminSeed>,
}

#[derive(Debug, Clone)]
pub struct SuperAdminSeed {
    pub email: String,
    pub password: String,
}

fn parsed_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// A zero period would stall `tokio::time::interval`.
pub fn cleanup_interval(raw: Option<&str>) -> anyhow::Result<u64> {
    let Some(raw) = raw else {
        return Ok(86_400);
    };
    let secs: u64 = raw.parse().context("SESSION_CLEANUP_INTERVAL_SECS")?;
    if secs == 0 {
        bail!("SESSION_CLEANUP_INTERVAL_SECS must be greater than zero");
    }
    Ok(secs)
}

/// Unset or zero disables the sweep.
pub fn pending_user_ttl(raw: Option<&str>) -> anyhow::Result<Option<u64>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let hours: u64 = raw.parse().context("PENDING_USER_TTL_HOURS")?;
    if hours > MAX_PENDING_USER_TTL_HOURS {
        bail!("PENDING_USER_TTL_HOURS must not exceed {MAX_PENDING_USER_TTL_HOURS}");
    }
    Ok(Some(hours).filter(|h| *h > 0))
}

fn super_admin_seed() -> Option<SuperAdminSeed> {
    let email = std::env::var("SUPER_ADMIN_EMAIL").ok()?;
    let password = std::env::var("SUPER_ADMIN_PASSWORD").ok()?;
    Some(SuperAdminSeed { email, password })
}

impl ApiConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: std::env::var("DATABASE_URL").context("DATABASE_URL")?,
            jwt_secret: std::env::var("JWT_SECRET").context("JWT_SECRET")?,
            api_port: parsed_or("API_PORT", 3110),
            access_token_ttl_secs: parsed_or(
                "ACCESS_TOKEN_TTL_SECS",
                homeswap_auth_types::token::ACCESS_TOKEN_EXP,
            ),
            session_cleanup_interval_secs: cleanup_interval(
                std::env::var("SESSION_CLEANUP_INTERVAL_SECS").ok().as_deref(),
            )?,
            pending_user_ttl_hours: pending_user_ttl(
                std::env::var("PENDING_USER_TTL_HOURS").ok().as_deref(),
            )?,
            super_admin: super_admin_seed(),
        })
    }
}
