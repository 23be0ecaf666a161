use sea_orm_migration::prelude::*;

use super::m20250512_000001_create_users_table::Users;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20250512_000002_create_products_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Products::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Products::VendorId).uuid().not_null())
                    .col(ColumnDef::new(Products::Name).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Products::Category)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Products::Description).text().not_null())
                    .col(
                        ColumnDef::new(Products::Price)
                            .decimal_len(19, 4)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Products::Quantity).integer().not_null())
                    .col(ColumnDef::new(Products::Delivery).boolean().not_null())
                    .col(
                        ColumnDef::new(Products::PickupLocation)
                            .string_len(512)
                            .null(),
                    )
                    // Serialized JSON arrays of URI / option strings. Kept as
                    // text so malformed rows degrade at parse time instead of
                    // failing the read.
                    .col(
                        ColumnDef::new(Products::Images)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(ColumnDef::new(Products::Sizes).text().null())
                    .col(ColumnDef::new(Products::Colors).text().null())
                    .col(
                        ColumnDef::new(Products::Status)
                            .string_len(32)
                            .not_null()
                            .default("active"),
                    )
                    .col(ColumnDef::new(Products::Sku).string_len(100).null())
                    .col(
                        ColumnDef::new(Products::ShopifyProductId)
                            .string_len(64)
                            .null(),
                    )
                    .col(ColumnDef::new(Products::LastSyncedAt).timestamp().null())
                    .col(
                        ColumnDef::new(Products::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Products::UpdatedAt).timestamp().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_products_vendor")
                            .from(Products::Table, Products::VendorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_products_vendor_created")
                    .table(Products::Table)
                    .col(Products::VendorId)
                    .col(Products::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Products {
    Table,
    Id,
    VendorId,
    Name,
    Category,
    Description,
    Price,
    Quantity,
    Delivery,
    PickupLocation,
    Images,
    Sizes,
    Colors,
    Status,
    Sku,
    ShopifyProductId,
    LastSyncedAt,
    CreatedAt,
    UpdatedAt,
}
