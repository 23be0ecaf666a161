use std::sync::Arc;

use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use tracing::instrument;

use crate::db::DbPool;
use crate::entities::product::{self, Entity as Product};
use crate::entities::user::{self, Entity as User};
use crate::errors::ServiceError;
use crate::services::csv::join_row;

/// Marketplace-wide totals for the admin dashboard.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AdminStats {
    pub total_users: u64,
    pub total_vendors: u64,
    pub verified_vendors: u64,
    pub total_products: u64,
    pub synced_products: u64,
}

const GENERIC_EXPORT_COLUMNS: [&str; 10] = [
    "id",
    "name",
    "category",
    "description",
    "price",
    "quantity",
    "delivery",
    "vendor_email",
    "vendor_name",
    "created_at",
];

/// Read-only aggregation over all users and products.
pub struct ReportService {
    db_pool: Arc<DbPool>,
}

impl ReportService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn stats(&self) -> Result<AdminStats, ServiceError> {
        let db = &*self.db_pool;

        let total_users = User::find().count(db).await?;
        let total_vendors = User::find()
            .filter(user::Column::IsAdmin.eq(false))
            .count(db)
            .await?;
        let verified_vendors = User::find()
            .filter(user::Column::IsAdmin.eq(false))
            .filter(user::Column::DocumentsVerified.eq(true))
            .count(db)
            .await?;
        let total_products = Product::find().count(db).await?;
        let synced_products = Product::find()
            .filter(product::Column::ShopifyProductId.is_not_null())
            .count(db)
            .await?;

        Ok(AdminStats {
            total_users,
            total_vendors,
            verified_vendors,
            total_products,
            synced_products,
        })
    }

    /// Every product joined with its vendor, newest first. Feeds both export
    /// formats.
    pub async fn products_with_vendors(
        &self,
    ) -> Result<Vec<(product::Model, user::Model)>, ServiceError> {
        let db = &*self.db_pool;

        let rows = Product::find()
            .find_also_related(User)
            .order_by_desc(product::Column::CreatedAt)
            .all(db)
            .await?;

        // A product without its vendor can only appear mid-cascade; skip it.
        Ok(rows
            .into_iter()
            .filter_map(|(product, vendor)| vendor.map(|vendor| (product, vendor)))
            .collect())
    }

    /// Listing counts for a set of vendors.
    pub async fn product_counts(
        &self,
        vendor_ids: &[uuid::Uuid],
    ) -> Result<std::collections::HashMap<uuid::Uuid, u64>, ServiceError> {
        let mut counts = std::collections::HashMap::new();
        if vendor_ids.is_empty() {
            return Ok(counts);
        }

        let db = &*self.db_pool;
        let rows = Product::find()
            .filter(product::Column::VendorId.is_in(vendor_ids.to_vec()))
            .all(db)
            .await?;

        for row in rows {
            *counts.entry(row.vendor_id).or_insert(0) += 1;
        }

        Ok(counts)
    }

    /// Generic CSV export: one row per product with a fixed column set.
    #[instrument(skip(self))]
    pub async fn export_generic_csv(&self) -> Result<String, ServiceError> {
        let items = self.products_with_vendors().await?;

        let mut lines = Vec::with_capacity(items.len() + 1);
        lines.push(GENERIC_EXPORT_COLUMNS.join(","));

        for (product, vendor) in &items {
            lines.push(join_row([
                product.id.to_string(),
                product.name.clone(),
                product.category.clone(),
                product.description.clone(),
                crate::services::shopify::export::format_price(&product.price),
                product.quantity.to_string(),
                if product.delivery { "yes" } else { "no" }.to_string(),
                vendor.email.clone(),
                vendor.name.clone(),
                product.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ]));
        }

        let mut body = lines.join("\n");
        body.push('\n');
        Ok(body)
    }
}
