use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub wallet_balance: i64,
    pub is_referral_active: bool,
    pub activated_at: Option<i64>,
    pub referrer_id: Option<String>,
    #[sea_orm(unique)]
    pub referral_code: String,
    pub total_referrals: i64,
    pub active_referrals: i64,
    pub total_earnings: i64,
    pub role: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
