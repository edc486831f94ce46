use sea_orm::entity::prelude::*;

/// Registration awaiting OTP verification.
/// The email must be unused across both `users` and `pending_users`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "pending_users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub phone_number: Option<String>,
    /// Referral code quoted at registration, if any.
    pub referral_code: Option<String>,
    pub role: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::otp_verifications::Entity")]
    OtpVerifications,
}

impl Related<super::otp_verifications::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OtpVerifications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
