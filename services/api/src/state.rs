use sea_orm::DatabaseConnection;

use crate::infra::db::{
    DbBadgeRepository, DbExchangeRepository, DbRegistrationRepository, DbSessionRepository,
    DbUserRepository,
};
use crate::usecase::token::TokenIssuer;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub jwt_secret: String,
    pub access_token_ttl_secs: u64,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn session_repo(&self) -> DbSessionRepository {
        DbSessionRepository {
            db: self.db.clone(),
        }
    }

    pub fn registration_repo(&self) -> DbRegistrationRepository {
        DbRegistrationRepository {
            db: self.db.clone(),
        }
    }

    pub fn badge_repo(&self) -> DbBadgeRepository {
        DbBadgeRepository {
            db: self.db.clone(),
        }
    }

    pub fn exchange_repo(&self) -> DbExchangeRepository {
        DbExchangeRepository {
            db: self.db.clone(),
        }
    }

    pub fn token_issuer(&self) -> TokenIssuer {
        TokenIssuer {
            jwt_secret: self.jwt_secret.clone(),
            ttl_secs: self.access_token_ttl_secs,
        }
    }
}
