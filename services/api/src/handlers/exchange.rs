use axum::{
    Json,
    extract::{Path, State},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use homeswap_domain::exchange::ExchangeStatus;

use crate::domain::types::{ExchangeRequestDetail, Property, UserSummary};
use crate::error::ApiError;
use crate::state::AppState;
use crate::usecase::exchange::AcceptExchangeUseCase;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRequestResponse {
    pub id: Uuid,
    pub message: String,
    pub status: ExchangeStatus,
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
    pub from_property_id: Uuid,
    pub to_property_id: Uuid,
    #[serde(serialize_with = "homeswap_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "homeswap_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
    pub from_user: UserSummary,
    pub to_user: UserSummary,
    pub from_property: Property,
    pub to_property: Property,
}

impl From<ExchangeRequestDetail> for ExchangeRequestResponse {
    fn from(detail: ExchangeRequestDetail) -> Self {
        let request = detail.request;
        Self {
            id: request.id,
            message: request.message,
            status: request.status,
            from_user_id: request.from_user_id,
            to_user_id: request.to_user_id,
            from_property_id: request.from_property_id,
            to_property_id: request.to_property_id,
            created_at: request.created_at,
            updated_at: request.updated_at,
            from_user: detail.from_user,
            to_user: detail.to_user,
            from_property: detail.from_property,
            to_property: detail.to_property,
        }
    }
}

// ── PATCH /exchange-request/{id}/accept ──────────────────────────────────────

pub async fn accept_exchange_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ExchangeRequestResponse>, ApiError> {
    let usecase = AcceptExchangeUseCase {
        exchanges: state.exchange_repo(),
        badges: state.badge_repo(),
    };
    let detail = usecase.execute(id).await?;
    Ok(Json(detail.into()))
}
