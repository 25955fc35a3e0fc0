use sea_orm::entity::prelude::*;

/// A registered account. Sellers (`is_seller = true`) may own and manage
/// products; everyone else is a regular customer account.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    /// Salted credential digest. Write-only: never serialized back to clients.
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub is_seller: bool,
    /// Deactivation stands in for deletion; accounts are never hard-deleted.
    #[sea_orm(default_value = "true")]
    pub is_active: bool,
    #[sea_orm(default_value = "false")]
    pub is_superuser: bool,
    pub date_joined: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// An account can own multiple products.
    #[sea_orm(has_many = "super::product::Entity")]
    Product,
    #[sea_orm(has_many = "super::auth_token::Entity")]
    AuthToken,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<super::auth_token::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AuthToken.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
