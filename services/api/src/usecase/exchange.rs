use tracing::info;
use uuid::Uuid;

use crate::domain::repository::{BadgeRepository, ExchangeRepository};
use crate::domain::types::ExchangeRequestDetail;
use crate::error::ApiError;
use crate::usecase::badge::award_trade_milestone;

pub struct AcceptExchangeUseCase<E: ExchangeRepository, B: BadgeRepository> {
    pub exchanges: E,
    pub badges: B,
}

impl<E: ExchangeRepository, B: BadgeRepository> AcceptExchangeUseCase<E, B> {
    pub async fn execute(&self, id: Uuid) -> Result<ExchangeRequestDetail, ApiError> {
        let request = self
            .exchanges
            .find_by_id(id)
            .await?
            .ok_or(ApiError::ExchangeRequestNotFound)?;

        let transition = request
            .status
            .accept(&request.parties())
            .map_err(|_| ApiError::ExchangeNotPending)?;

        // Status, both properties and the trade counts commit together.
        let progress = self
            .exchanges
            .commit_transition(id, request.status, &transition)
            .await?;
        info!(exchange_request_id = %id, "exchange request accepted");

        // Counts are of acceptances where the party was the recipient, for
        // both parties alike.
        for p in progress {
            info!(
                exchange_request_id = %id,
                user_id = %p.user_id,
                before = p.before,
                after = p.after,
                "trade count evaluated"
            );
            award_trade_milestone(&self.badges, p).await;
        }

        self.exchanges
            .find_detail(id)
            .await?
            .ok_or(ApiError::ExchangeRequestNotFound)
    }
}
