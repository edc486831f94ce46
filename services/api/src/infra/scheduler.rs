use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use crate::infra::db::{DbRegistrationRepository, DbSessionRepository};
use crate::usecase::sweeper::{PendingUserSweeper, SessionSweeper};

/// Sweep inactive sessions on a fixed schedule, starting immediately.
///
/// A failed cycle is logged and the next tick retries; the task never exits.
pub fn spawn_session_cleanup(
    sweeper: SessionSweeper<DbSessionRepository>,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            match sweeper.run_once(Utc::now()).await {
                Ok(rows) => info!(rows, "inactive sessions swept"),
                Err(e) => error!(error = ?e, "session cleanup failed"),
            }
        }
    })
}

pub fn spawn_pending_user_cleanup(
    sweeper: PendingUserSweeper<DbRegistrationRepository>,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            match sweeper.run_once(Utc::now()).await {
                Ok(rows) => info!(rows, "stale pending registrations swept"),
                Err(e) => error!(error = ?e, "pending registration cleanup failed"),
            }
        }
    })
}
