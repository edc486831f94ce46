use sea_orm::entity::prelude::*;

/// Verified account. Created only by OTP verification of a pending user.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    /// `USER` | `ADMIN` | `SUPER_ADMIN`.
    pub role: String,
    pub is_suspended: bool,
    pub suspension_reason: Option<String>,
    #[sea_orm(unique)]
    pub referral_code: Option<String>,
    /// Referral code of the user who referred this one.
    pub referred_by: Option<String>,
    pub total_referrals: i32,
    pub balance: i64,
    /// SHA-256 hex digest of the outstanding password-reset token.
    pub reset_token_hash: Option<String>,
    pub reset_token_expires_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::active_sessions::Entity")]
    ActiveSessions,
    #[sea_orm(has_many = "super::user_badges::Entity")]
    UserBadges,
    #[sea_orm(has_many = "super::properties::Entity")]
    Properties,
}

impl Related<super::active_sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ActiveSessions.def()
    }
}

impl Related<super::user_badges::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserBadges.def()
    }
}

impl Related<super::properties::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Properties.def()
    }
}

impl Related<super::badges::Entity> for Entity {
    fn to() -> RelationDef {
        super::user_badges::Relation::Badge.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::user_badges::Relation::User.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
