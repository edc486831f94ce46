use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Properties::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Properties::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Properties::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(Properties::Title).string().not_null())
                    .col(
                        ColumnDef::new(Properties::IsExchanged)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Properties::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Properties::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Properties::Table, Properties::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ExchangeRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExchangeRequests::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ExchangeRequests::Message).text().not_null())
                    .col(
                        ColumnDef::new(ExchangeRequests::Status)
                            .string()
                            .not_null()
                            .default("PENDING"),
                    )
                    .col(ColumnDef::new(ExchangeRequests::FromUserId).uuid().not_null())
                    .col(ColumnDef::new(ExchangeRequests::ToUserId).uuid().not_null())
                    .col(
                        ColumnDef::new(ExchangeRequests::FromPropertyId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ExchangeRequests::ToPropertyId).uuid().not_null())
                    .col(
                        ColumnDef::new(ExchangeRequests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExchangeRequests::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ExchangeRequests::Table, ExchangeRequests::FromUserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ExchangeRequests::Table, ExchangeRequests::ToUserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ExchangeRequests::Table, ExchangeRequests::FromPropertyId)
                            .to(Properties::Table, Properties::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ExchangeRequests::Table, ExchangeRequests::ToPropertyId)
                            .to(Properties::Table, Properties::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Trade-badge counts: accepted requests per recipient.
        manager
            .create_index(
                Index::create()
                    .table(ExchangeRequests::Table)
                    .col(ExchangeRequests::ToUserId)
                    .col(ExchangeRequests::Status)
                    .name("idx_exchange_requests_to_user_id_status")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ExchangeRequests::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Properties::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Properties {
    Table,
    Id,
    OwnerId,
    Title,
    IsExchanged,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum ExchangeRequests {
    Table,
    Id,
    Message,
    Status,
    FromUserId,
    ToUserId,
    FromPropertyId,
    ToPropertyId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
