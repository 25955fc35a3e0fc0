use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create accounts table
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(pk_auto(Accounts::Id))
                    .col(string_len(Accounts::Username, 20).unique_key())
                    .col(string(Accounts::PasswordHash))
                    .col(string_len(Accounts::FirstName, 50))
                    .col(string_len(Accounts::LastName, 50))
                    .col(boolean(Accounts::IsSeller))
                    .col(boolean(Accounts::IsActive).default(true))
                    .col(boolean(Accounts::IsSuperuser).default(false))
                    .col(timestamp_with_time_zone(Accounts::DateJoined))
                    .to_owned(),
            )
            .await?;

        // Create products table
        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(pk_auto(Products::Id))
                    .col(string(Products::Description))
                    .col(decimal_len(Products::Price, 10, 2))
                    .col(integer(Products::Quantity))
                    .col(boolean(Products::IsActive).default(true))
                    .col(integer(Products::SellerId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_seller")
                            .from(Products::Table, Products::SellerId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create auth_tokens table
        manager
            .create_table(
                Table::create()
                    .table(AuthTokens::Table)
                    .if_not_exists()
                    .col(string_len(AuthTokens::Key, 40).primary_key())
                    .col(integer(AuthTokens::AccountId).unique_key())
                    .col(timestamp_with_time_zone(AuthTokens::Created))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_auth_token_account")
                            .from(AuthTokens::Table, AuthTokens::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AuthTokens::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Accounts {
    Table,
    Id,
    Username,
    PasswordHash,
    FirstName,
    LastName,
    IsSeller,
    IsActive,
    IsSuperuser,
    DateJoined,
}

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
    Description,
    Price,
    Quantity,
    IsActive,
    SellerId,
}

#[derive(DeriveIden)]
enum AuthTokens {
    Table,
    Key,
    AccountId,
    Created,
}
