use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ActiveSessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ActiveSessions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ActiveSessions::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(ActiveSessions::SessionToken)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(ActiveSessions::IpAddress).string().not_null())
                    .col(
                        ColumnDef::new(ActiveSessions::LastActivity)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ActiveSessions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ActiveSessions::Table, ActiveSessions::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(ActiveSessions::Table)
                    .col(ActiveSessions::UserId)
                    .name("idx_active_sessions_user_id")
                    .to_owned(),
            )
            .await?;

        // Cleanup sweep deletes by staleness cutoff.
        manager
            .create_index(
                Index::create()
                    .table(ActiveSessions::Table)
                    .col(ActiveSessions::LastActivity)
                    .name("idx_active_sessions_last_activity")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ActiveSessions::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ActiveSessions {
    Table,
    Id,
    UserId,
    SessionToken,
    IpAddress,
    LastActivity,
    CreatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
