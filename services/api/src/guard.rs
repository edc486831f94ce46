//! Bearer-token request guard.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use homeswap_auth_types::bearer::bearer_token;

use crate::error::ApiError;
use crate::state::AppState;
use crate::usecase::authenticate::{AuthContext, AuthenticateUseCase};

impl FromRequestParts<AppState> for AuthContext {
    type Rejection = ApiError;

    // Header parsing happens synchronously; the returned future owns
    // everything it touches.
    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let bearer = bearer_token(&parts.headers).map(str::to_owned);
        let usecase = AuthenticateUseCase {
            users: state.user_repo(),
            sessions: state.session_repo(),
            jwt_secret: state.jwt_secret.clone(),
        };

        async move {
            let bearer = bearer.map_err(|_| ApiError::MissingToken)?;
            usecase.execute(&bearer).await
        }
    }
}
