use super::account;
use sea_orm::entity::prelude::*;

/// A product offered by a seller account.
/// `seller_id` is a mutable reference: reassigning it moves the product to the
/// new owner, and a product has exactly one seller at any time.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub description: String,
    /// Fixed-point price: 10 total digits, 2 after the decimal point.
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub price: Decimal,
    /// Non-negativity is enforced at the API boundary, not by the database.
    pub quantity: i32,
    #[sea_orm(default_value = "true")]
    pub is_active: bool,
    pub seller_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A product belongs to exactly one seller.
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::SellerId",
        to = "super::account::Column::Id"
    )]
    Account,
}

impl Related<account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
