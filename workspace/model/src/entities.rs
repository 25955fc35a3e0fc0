//! This file serves as the root for all SeaORM entity modules.
//! The data models for the storefront: accounts, the products they sell,
//! and the bearer tokens used to authenticate them.

pub mod account;
pub mod auth_token;
pub mod product;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::account::Entity as Account;
    pub use super::auth_token::Entity as AuthToken;
    pub use super::product::Entity as Product;
}
