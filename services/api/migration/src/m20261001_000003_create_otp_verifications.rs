use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OtpVerifications::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OtpVerifications::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(OtpVerifications::PendingUserId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(OtpVerifications::Code).string_len(4).not_null())
                    .col(ColumnDef::new(OtpVerifications::Method).string().not_null())
                    .col(
                        ColumnDef::new(OtpVerifications::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(OtpVerifications::VerifiedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(OtpVerifications::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(OtpVerifications::Table, OtpVerifications::PendingUserId)
                            .to(PendingUsers::Table, PendingUsers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(OtpVerifications::Table)
                    .col(OtpVerifications::PendingUserId)
                    .col(OtpVerifications::CreatedAt)
                    .name("idx_otp_verifications_pending_user_id_created_at")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OtpVerifications::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum OtpVerifications {
    Table,
    Id,
    PendingUserId,
    Code,
    Method,
    ExpiresAt,
    VerifiedAt,
    CreatedAt,
}

#[derive(Iden)]
enum PendingUsers {
    Table,
    Id,
}
