use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context as _;
use sea_orm::Database;
use tracing::info;

use homeswap_api::config::ApiConfig;
use homeswap_api::infra::scheduler::{spawn_pending_user_cleanup, spawn_session_cleanup};
use homeswap_api::router::build_router;
use homeswap_api::state::AppState;
use homeswap_api::usecase::registration::{SeedOutcome, SeedSuperAdminUseCase};
use homeswap_api::usecase::sweeper::{PendingUserSweeper, SessionSweeper};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    homeswap_core::tracing::init_tracing("info,sqlx=warn");

    let config = ApiConfig::from_env()?;

    let db = Database::connect(&config.database_url)
        .await
        .context("failed to connect to database")?;

    let state = AppState {
        db,
        jwt_secret: config.jwt_secret,
        access_token_ttl_secs: config.access_token_ttl_secs,
    };

    if let Some(seed) = &config.super_admin {
        let outcome = SeedSuperAdminUseCase {
            registrations: state.registration_repo(),
        }
        .execute(&seed.email, &seed.password)
        .await
        .context("failed to seed super admin")?;
        if outcome == SeedOutcome::AlreadyClaimed {
            info!("super admin email already registered, seed skipped");
        }
    }

    spawn_session_cleanup(
        SessionSweeper {
            sessions: state.session_repo(),
        },
        Duration::from_secs(config.session_cleanup_interval_secs),
    );
    if let Some(hours) = config.pending_user_ttl_hours {
        let ttl = chrono::Duration::hours(i64::try_from(hours).context("PENDING_USER_TTL_HOURS")?);
        spawn_pending_user_cleanup(
            PendingUserSweeper {
                registrations: state.registration_repo(),
                ttl,
            },
            Duration::from_secs(3_600),
        );
    }

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.api_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("api service listening on {addr}");
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        let _ = tokio::signal::ctrl_c().await;
        info!("shutdown signal received");
    })
    .await
    .context("server error")
}
