use tracing::{error, info};
use uuid::Uuid;

use homeswap_domain::badge::{BadgeType, referral_badge, trade_badge};
use homeswap_domain::user::UserRole;

use crate::domain::repository::{BadgeRepository, UserRepository};
use crate::domain::types::{AwardOutcome, TradeProgress, User};
use crate::error::ApiError;

/// Award a badge after the triggering write has committed.
///
/// Failures are logged and swallowed: the milestone write is already durable
/// and the award is idempotent, so a later evaluation can still grant it.
pub async fn award_after_commit<B: BadgeRepository>(
    badges: &B,
    user_id: Uuid,
    badge: BadgeType,
) -> Option<AwardOutcome> {
    match badges.award(user_id, badge).await {
        Ok(outcome) => {
            if outcome == AwardOutcome::Awarded {
                info!(user_id = %user_id, badge = %badge, "badge awarded");
            }
            Some(outcome)
        }
        Err(e) => {
            error!(user_id = %user_id, badge = %badge, error = %e, "badge award failed");
            None
        }
    }
}

/// Evaluate the referral ladder for a referrer's new total.
pub async fn award_referral_milestone<B: BadgeRepository>(
    badges: &B,
    referrer_id: Uuid,
    total_referrals: u32,
) -> Option<BadgeType> {
    let badge = referral_badge(total_referrals)?;
    award_after_commit(badges, referrer_id, badge).await?;
    Some(badge)
}

/// Evaluate the trade ladder against a party's post-acceptance count.
pub async fn award_trade_milestone<B: BadgeRepository>(
    badges: &B,
    progress: TradeProgress,
) -> Option<BadgeType> {
    let badge = trade_badge(progress.after)?;
    award_after_commit(badges, progress.user_id, badge).await?;
    Some(badge)
}

// ── AwardBadge (admin) ───────────────────────────────────────────────────────

pub struct AwardBadgeUseCase<U: UserRepository, B: BadgeRepository> {
    pub users: U,
    pub badges: B,
}

impl<U: UserRepository, B: BadgeRepository> AwardBadgeUseCase<U, B> {
    pub async fn execute(
        &self,
        actor: &User,
        target_id: Uuid,
        badge: BadgeType,
    ) -> Result<AwardOutcome, ApiError> {
        // ADMIN only; SUPER_ADMIN manages roles, not badges.
        if actor.role != UserRole::Admin {
            return Err(ApiError::Forbidden);
        }
        self.users
            .find_by_id(target_id)
            .await?
            .ok_or(ApiError::UserNotFound)?;

        let outcome = self.badges.award(target_id, badge).await?;
        info!(actor_id = %actor.id, user_id = %target_id, badge = %badge, ?outcome, "manual badge award");
        Ok(outcome)
    }
}
