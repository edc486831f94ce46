use chrono::Utc;
use uuid::Uuid;

use homeswap_auth_types::token::validate_access_token;

use crate::domain::repository::{SessionRepository, UserRepository};
use crate::domain::types::User;
use crate::error::ApiError;

/// Identity of an authenticated request, handed to handlers explicitly.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user: User,
    pub session_id: Uuid,
    pub session_token: String,
}

/// Per-request guard: a valid signature is not enough, the embedded session
/// token must still name a live session.
pub struct AuthenticateUseCase<U: UserRepository, S: SessionRepository> {
    pub users: U,
    pub sessions: S,
    pub jwt_secret: String,
}

impl<U: UserRepository, S: SessionRepository> AuthenticateUseCase<U, S> {
    pub async fn execute(&self, bearer: &str) -> Result<AuthContext, ApiError> {
        // Signature, expiry and payload failures all look the same to the client.
        let info =
            validate_access_token(bearer, &self.jwt_secret).map_err(|_| ApiError::InvalidToken)?;

        let user = self
            .users
            .find_by_id(info.user_id)
            .await?
            .ok_or(ApiError::TokenSubjectNotFound)?;

        // Suspension wins over session liveness so a suspended user cannot keep
        // a session warm.
        if user.is_suspended {
            return Err(ApiError::AccountSuspended(user.suspension_message()));
        }

        let session = self
            .sessions
            .find(user.id, &info.session_token)
            .await?
            .ok_or(ApiError::SessionTerminated)?;

        self.sessions.touch(session.id, Utc::now()).await?;

        Ok(AuthContext {
            user,
            session_id: session.id,
            session_token: session.session_token,
        })
    }
}
