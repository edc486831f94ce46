use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PendingUsers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PendingUsers::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PendingUsers::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(PendingUsers::PasswordHash).string().not_null())
                    .col(ColumnDef::new(PendingUsers::FullName).string().not_null())
                    .col(ColumnDef::new(PendingUsers::PhoneNumber).string())
                    .col(ColumnDef::new(PendingUsers::ReferralCode).string())
                    .col(
                        ColumnDef::new(PendingUsers::Role)
                            .string()
                            .not_null()
                            .default("USER"),
                    )
                    .col(
                        ColumnDef::new(PendingUsers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Stale-registration sweep filters by age.
        manager
            .create_index(
                Index::create()
                    .table(PendingUsers::Table)
                    .col(PendingUsers::CreatedAt)
                    .name("idx_pending_users_created_at")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PendingUsers::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum PendingUsers {
    Table,
    Id,
    Email,
    PasswordHash,
    FullName,
    PhoneNumber,
    ReferralCode,
    Role,
    CreatedAt,
}
