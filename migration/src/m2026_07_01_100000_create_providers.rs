//! Migration to create the providers table.
//!
//! This migration creates the providers table holding the travel-package
//! supplier catalog, with unique name/email/phone and a nullable kind column.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Providers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Providers::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Providers::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Providers::Email).string_len(255).not_null())
                    .col(ColumnDef::new(Providers::Phone).string_len(20).not_null())
                    .col(ColumnDef::new(Providers::Type).string_len(50).null())
                    .col(
                        ColumnDef::new(Providers::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Providers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Providers::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique indexes on the fields the soft-delete markers free for reuse
        manager
            .create_index(
                Index::create()
                    .name("idx_providers_name")
                    .table(Providers::Table)
                    .col(Providers::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_providers_email")
                    .table(Providers::Table)
                    .col(Providers::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_providers_phone")
                    .table(Providers::Table)
                    .col(Providers::Phone)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop indexes first
        manager
            .drop_index(
                Index::drop()
                    .name("idx_providers_phone")
                    .table(Providers::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_providers_email")
                    .table(Providers::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_providers_name")
                    .table(Providers::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(Providers::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Providers {
    Table,
    Id,
    Name,
    Email,
    Phone,
    Type,
    Active,
    CreatedAt,
    UpdatedAt,
}
