use sea_orm::entity::prelude::*;

/// Proposal to swap stays between two users' properties.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "exchange_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub message: String,
    /// `PENDING` | `ACCEPTED` | `REJECTED` | `CANCELLED`.
    pub status: String,
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
    pub from_property_id: Uuid,
    pub to_property_id: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::FromUserId",
        to = "super::users::Column::Id"
    )]
    FromUser,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::ToUserId",
        to = "super::users::Column::Id"
    )]
    ToUser,
    #[sea_orm(
        belongs_to = "super::properties::Entity",
        from = "Column::FromPropertyId",
        to = "super::properties::Column::Id"
    )]
    FromProperty,
    #[sea_orm(
        belongs_to = "super::properties::Entity",
        from = "Column::ToPropertyId",
        to = "super::properties::Column::Id"
    )]
    ToProperty,
}

impl ActiveModelBehavior for ActiveModel {}
