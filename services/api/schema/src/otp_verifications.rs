use sea_orm::entity::prelude::*;

/// One-time code issued to a pending user.
/// Valid while `verified_at` is null and `expires_at >= now`; expires 5 minutes after creation.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "otp_verifications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub pending_user_id: Uuid,
    pub code: String,
    /// `email` | `phone`.
    pub method: String,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub verified_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::pending_users::Entity",
        from = "Column::PendingUserId",
        to = "super::pending_users::Column::Id"
    )]
    PendingUser,
}

impl Related<super::pending_users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PendingUser.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
