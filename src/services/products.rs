use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::cache::{listing_key, listing_prefix, CacheBackend};
use crate::db::DbPool;
use crate::entities::product::{self, Column as ProductColumn, Entity as Product};
use crate::errors::ServiceError;

/// Fields accepted when creating a listing.
#[derive(Debug, Clone)]
pub struct CreateProductInput {
    pub name: String,
    pub category: String,
    pub description: String,
    pub price: Decimal,
    pub quantity: i32,
    pub delivery: bool,
    pub pickup_location: Option<String>,
    pub images: Option<Vec<String>>,
    pub sizes: Option<Vec<String>>,
    pub colors: Option<Vec<String>>,
    pub status: Option<String>,
    pub sku: Option<String>,
}

/// Partial update; unset fields keep their previous values.
#[derive(Debug, Clone, Default)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub quantity: Option<i32>,
    pub delivery: Option<bool>,
    pub pickup_location: Option<String>,
    pub images: Option<Vec<String>>,
    pub sizes: Option<Vec<String>>,
    pub colors: Option<Vec<String>>,
    pub status: Option<String>,
    pub sku: Option<String>,
}

/// Cached representation of one listing page.
#[derive(Debug, Serialize, Deserialize)]
struct CachedListing {
    items: Vec<product::Model>,
    total: u64,
}

/// Vendor-scoped product management with a read-through listing cache.
pub struct ProductService {
    db_pool: Arc<DbPool>,
    cache: Arc<dyn CacheBackend>,
    cache_ttl: Duration,
    product_limit: u64,
}

impl ProductService {
    pub fn new(
        db_pool: Arc<DbPool>,
        cache: Arc<dyn CacheBackend>,
        cache_ttl: Duration,
        product_limit: u64,
    ) -> Self {
        Self {
            db_pool,
            cache,
            cache_ttl,
            product_limit,
        }
    }

    /// The caller's products, newest first. Pages are cached per
    /// (vendor, page, limit) and refreshed eagerly on mutation.
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        vendor_id: Uuid,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<product::Model>, u64), ServiceError> {
        let page = page.max(1);
        let limit = limit.clamp(1, 100);

        let key = listing_key(vendor_id, page, limit);
        if let Ok(Some(cached)) = self.cache.get(&key).await {
            match serde_json::from_str::<CachedListing>(&cached) {
                Ok(listing) => return Ok((listing.items, listing.total)),
                Err(err) => {
                    // Stale shape after a deploy; fall through to the store.
                    warn!(error = %err, "Discarding unreadable cached listing page");
                    let _ = self.cache.delete(&key).await;
                }
            }
        }

        let db = &*self.db_pool;
        let paginator = Product::find()
            .filter(ProductColumn::VendorId.eq(vendor_id))
            .order_by_desc(ProductColumn::CreatedAt)
            .paginate(db, limit);

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page - 1).await?;

        if let Ok(serialized) = serde_json::to_string(&CachedListing {
            items: items.clone(),
            total,
        }) {
            let _ = self
                .cache
                .set(&key, &serialized, Some(self.cache_ttl))
                .await;
        }

        Ok((items, total))
    }

    /// Number of listings the vendor currently owns.
    pub async fn count_for_vendor(&self, vendor_id: Uuid) -> Result<u64, ServiceError> {
        let db = &*self.db_pool;
        Ok(Product::find()
            .filter(ProductColumn::VendorId.eq(vendor_id))
            .count(db)
            .await?)
    }

    /// Create a listing for the vendor. Rejected with `LimitExceeded` once
    /// the vendor already owns the configured maximum. The count-then-insert
    /// pair is not transactional; two racing creations can momentarily pass
    /// the cap.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_product(
        &self,
        vendor_id: Uuid,
        input: CreateProductInput,
    ) -> Result<product::Model, ServiceError> {
        let owned = self.count_for_vendor(vendor_id).await?;
        if owned >= self.product_limit {
            return Err(ServiceError::LimitExceeded(format!(
                "Vendors may list at most {} products",
                self.product_limit
            )));
        }

        let db = &*self.db_pool;
        let model = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            vendor_id: Set(vendor_id),
            name: Set(input.name),
            category: Set(input.category),
            description: Set(input.description),
            price: Set(input.price),
            quantity: Set(input.quantity),
            delivery: Set(input.delivery),
            pickup_location: Set(input.pickup_location),
            images: Set(serialize_list(input.images.unwrap_or_default())),
            sizes: Set(input.sizes.map(serialize_list)),
            colors: Set(input.colors.map(serialize_list)),
            status: match input.status {
                Some(status) => Set(status),
                None => sea_orm::ActiveValue::NotSet,
            },
            sku: Set(input.sku),
            shopify_product_id: Set(None),
            last_synced_at: Set(None),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };

        let created = model.insert(db).await?;
        self.invalidate_listing(vendor_id).await;

        info!(product_id = %created.id, vendor_id = %vendor_id, "Product created");

        Ok(created)
    }

    /// Fetch one of the vendor's products. A row owned by someone else is
    /// indistinguishable from a missing one.
    pub async fn get_product(
        &self,
        vendor_id: Uuid,
        id: Uuid,
    ) -> Result<product::Model, ServiceError> {
        let db = &*self.db_pool;
        Product::find_by_id(id)
            .filter(ProductColumn::VendorId.eq(vendor_id))
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Product not found".to_string()))
    }

    /// Partial update; only the owning vendor's rows are visible.
    #[instrument(skip(self, input))]
    pub async fn update_product(
        &self,
        vendor_id: Uuid,
        id: Uuid,
        input: UpdateProductInput,
    ) -> Result<product::Model, ServiceError> {
        let existing = self.get_product(vendor_id, id).await?;

        let db = &*self.db_pool;
        let mut model: product::ActiveModel = existing.into();

        if let Some(name) = input.name {
            model.name = Set(name);
        }
        if let Some(category) = input.category {
            model.category = Set(category);
        }
        if let Some(description) = input.description {
            model.description = Set(description);
        }
        if let Some(price) = input.price {
            model.price = Set(price);
        }
        if let Some(quantity) = input.quantity {
            model.quantity = Set(quantity);
        }
        if let Some(delivery) = input.delivery {
            model.delivery = Set(delivery);
        }
        if let Some(pickup_location) = input.pickup_location {
            model.pickup_location = Set(Some(pickup_location));
        }
        if let Some(images) = input.images {
            model.images = Set(serialize_list(images));
        }
        if let Some(sizes) = input.sizes {
            model.sizes = Set(Some(serialize_list(sizes)));
        }
        if let Some(colors) = input.colors {
            model.colors = Set(Some(serialize_list(colors)));
        }
        if let Some(status) = input.status {
            model.status = Set(status);
        }
        if let Some(sku) = input.sku {
            model.sku = Set(Some(sku));
        }

        model.updated_at = Set(Some(Utc::now()));

        let updated = model.update(db).await?;
        self.invalidate_listing(vendor_id).await;

        info!(product_id = %updated.id, "Product updated");

        Ok(updated)
    }

    /// Delete one of the vendor's products; a second delete reports
    /// `NotFound`.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, vendor_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        let existing = self.get_product(vendor_id, id).await?;

        let db = &*self.db_pool;
        existing.delete(db).await?;
        self.invalidate_listing(vendor_id).await;

        info!(product_id = %id, vendor_id = %vendor_id, "Product deleted");

        Ok(())
    }

    /// Administrator delete of any vendor's product. Returns the owning
    /// vendor so callers can report it.
    #[instrument(skip(self))]
    pub async fn delete_product_as_admin(&self, id: Uuid) -> Result<Uuid, ServiceError> {
        let db = &*self.db_pool;
        let existing = Product::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Product not found".to_string()))?;

        let vendor_id = existing.vendor_id;
        existing.delete(db).await?;
        self.invalidate_listing(vendor_id).await;

        info!(product_id = %id, vendor_id = %vendor_id, "Product deleted by admin");

        Ok(vendor_id)
    }

    /// All products of one vendor, newest first (used by exports and sync).
    pub async fn all_for_vendor(
        &self,
        vendor_id: Uuid,
    ) -> Result<Vec<product::Model>, ServiceError> {
        let db = &*self.db_pool;
        Ok(Product::find()
            .filter(ProductColumn::VendorId.eq(vendor_id))
            .order_by_desc(ProductColumn::CreatedAt)
            .all(db)
            .await?)
    }

    async fn invalidate_listing(&self, vendor_id: Uuid) {
        if let Err(err) = self.cache.delete_prefix(&listing_prefix(vendor_id)).await {
            warn!(vendor_id = %vendor_id, error = %err, "Listing cache invalidation failed");
        }
    }
}

fn serialize_list(values: Vec<String>) -> String {
    serde_json::to_string(&values).unwrap_or_else(|_| "[]".to_string())
}
