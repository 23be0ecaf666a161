use sea_orm_migration::prelude::*;

use super::m20250512_000001_create_users_table::Users;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20250512_000003_create_shopify_connections_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ShopifyConnections::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ShopifyConnections::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ShopifyConnections::VendorId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ShopifyConnections::StoreUrl)
                            .string_len(512)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ShopifyConnections::AccessToken)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ShopifyConnections::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(ShopifyConnections::LastSyncedAt)
                            .timestamp()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ShopifyConnections::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(ShopifyConnections::UpdatedAt)
                            .timestamp()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_shopify_connections_vendor")
                            .from(ShopifyConnections::Table, ShopifyConnections::VendorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One connection row per vendor.
        manager
            .create_index(
                Index::create()
                    .name("idx_shopify_connections_vendor")
                    .table(ShopifyConnections::Table)
                    .col(ShopifyConnections::VendorId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ShopifyConnections::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum ShopifyConnections {
    Table,
    Id,
    VendorId,
    StoreUrl,
    AccessToken,
    Active,
    LastSyncedAt,
    CreatedAt,
    UpdatedAt,
}
