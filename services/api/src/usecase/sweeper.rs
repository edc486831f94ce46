use chrono::{DateTime, Utc};

use crate::domain::repository::{RegistrationRepository, SessionRepository};
use crate::domain::types::SESSION_RETENTION_DAYS;
use crate::error::ApiError;

// ── Session cleanup ──────────────────────────────────────────────────────────

/// Deletes sessions idle longer than the retention window.
///
/// Scheduling lives in `infra::scheduler`.
pub struct SessionSweeper<S: SessionRepository> {
    pub sessions: S,
}

impl<S: SessionRepository> SessionSweeper<S> {
    pub async fn run_once(&self, now: DateTime<Utc>) -> Result<u64, ApiError> {
        let cutoff = now - chrono::Duration::days(SESSION_RETENTION_DAYS);
        self.sessions.delete_inactive_since(cutoff).await
    }
}

// ── Pending registration cleanup ─────────────────────────────────────────────

/// Deletes pending registrations (and their OTPs) older than `ttl`.
pub struct PendingUserSweeper<R: RegistrationRepository> {
    pub registrations: R,
    pub ttl: chrono::Duration,
}

impl<R: RegistrationRepository> PendingUserSweeper<R> {
    pub async fn run_once(&self, now: DateTime<Utc>) -> Result<u64, ApiError> {
        self.registrations
            .delete_pending_before(now - self.ttl)
            .await
    }
}
