use sea_orm_migration::prelude::*;

mod m20261001_000001_create_users;
mod m20261001_000002_create_pending_users;
mod m20261001_000003_create_otp_verifications;
mod m20261001_000004_create_active_sessions;
mod m20261001_000005_create_badges;
mod m20261001_000006_create_exchanges;
mod m20261001_000007_create_outbox_events;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_create_users::Migration),
            Box::new(m20261001_000002_create_pending_users::Migration),
            Box::new(m20261001_000003_create_otp_verifications::Migration),
            Box::new(m20261001_000004_create_active_sessions::Migration),
            Box::new(m20261001_000005_create_badges::Migration),
            Box::new(m20261001_000006_create_exchanges::Migration),
            Box::new(m20261001_000007_create_outbox_events::Migration),
        ]
    }
}
