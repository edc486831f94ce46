use sea_orm_migration::prelude::*;

use homeswap_domain::badge::BadgeType;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Badges::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Badges::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .default(Expr::cust("gen_random_uuid()")),
                    )
                    .col(ColumnDef::new(Badges::Type).string().not_null().unique_key())
                    .col(ColumnDef::new(Badges::DisplayName).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserBadges::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(UserBadges::UserId).uuid().not_null())
                    .col(ColumnDef::new(UserBadges::BadgeId).uuid().not_null())
                    .col(
                        ColumnDef::new(UserBadges::AwardedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(UserBadges::UserId)
                            .col(UserBadges::BadgeId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(UserBadges::Table, UserBadges::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(UserBadges::Table, UserBadges::BadgeId)
                            .to(Badges::Table, Badges::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Seed the catalog so milestone awards always resolve.
        let mut seed = Query::insert();
        seed.into_table(Badges::Table)
            .columns([Badges::Type, Badges::DisplayName]);
        for badge in BadgeType::ALL {
            seed.values([badge.as_str().into(), badge.display_name().into()])
                .map_err(|e| DbErr::Custom(e.to_string()))?;
        }
        seed.on_conflict(OnConflict::column(Badges::Type).do_nothing().to_owned());
        manager.exec_stmt(seed).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserBadges::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Badges::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Badges {
    Table,
    Id,
    Type,
    DisplayName,
}

#[derive(Iden)]
enum UserBadges {
    Table,
    UserId,
    BadgeId,
    AwardedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
