use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, patch, post},
};
use tower::ServiceBuilder;

use homeswap_core::health::{healthz, readiness};
use homeswap_core::middleware::{propagate_request_id_layer, request_id_layer, trace_layer};

use crate::handlers::{
    account::{change_password, forgot_password, reset_password},
    auth::{
        login, logout, register, resend_otp, reset_sessions_and_suspension, send_otp, verify_otp,
    },
    exchange::accept_exchange_request,
    users::{award_badge, delete_user, get_me, update_role},
};
use crate::state::AppState;

async fn readyz(State(state): State<AppState>) -> StatusCode {
    readiness(state.db.ping().await)
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Registration
        .route("/auth/register", post(register))
        .route("/auth/send-otp", post(send_otp))
        .route("/auth/verify-otp", post(verify_otp))
        .route("/auth/resend-otp", post(resend_otp))
        // Sessions
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route(
            "/auth/reset-sessions-and-suspension",
            post(reset_sessions_and_suspension),
        )
        // Passwords
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/reset-password", post(reset_password))
        .route("/auth/change-password", patch(change_password))
        // Users
        .route("/users/me", get(get_me))
        .route("/users/{id}", delete(delete_user))
        .route("/users/{id}/role", patch(update_role))
        .route("/users/{id}/badges", patch(award_badge))
        // Exchanges
        .route(
            "/exchange-request/{id}/accept",
            patch(accept_exchange_request),
        )
        // Outermost first: the trace span reads the stamped request id.
        .layer(
            ServiceBuilder::new()
                .layer(request_id_layer())
                .layer(propagate_request_id_layer())
                .layer(trace_layer()),
        )
        .with_state(state)
}
