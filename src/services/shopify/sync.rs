//! Remote sync client: pushes vendor products to the Shopify Admin API,
//! one product at a time, collecting per-product failures into a summary
//! instead of aborting the batch.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::product::{self, Entity as Product};
use crate::entities::{shopify_connection, user};
use crate::errors::ServiceError;
use crate::services::shopify::connection::ShopifyConnectionService;
use crate::services::shopify::export::{
    format_price, parse_string_list, validate_images, vendor_tags,
};

const SHOPIFY_API_VERSION: &str = "2024-01";

/// Product payload sent to the remote platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteProduct {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub title: String,
    pub body_html: String,
    pub vendor: String,
    pub product_type: String,
    pub tags: String,
    pub status: String,
    pub variants: Vec<RemoteVariant>,
    pub images: Vec<RemoteImage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteVariant {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option2: Option<String>,
    pub price: String,
    pub sku: String,
    pub inventory_management: String,
    pub inventory_quantity: i64,
    pub requires_shipping: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteImage {
    pub src: String,
}

#[derive(Debug, Serialize)]
struct ProductEnvelope {
    product: RemoteProduct,
}

/// Minimal view of a remote product as returned by the Admin API.
#[derive(Debug, Deserialize)]
struct RemoteProductRef {
    id: Option<i64>,
    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProductListEnvelope {
    products: Vec<RemoteProductRef>,
}

#[derive(Debug, Deserialize)]
struct ProductRefEnvelope {
    product: RemoteProductRef,
}

/// Per-product sync failure recorded in the batch summary.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SyncError {
    pub product_id: Uuid,
    pub name: String,
    pub message: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SyncedProduct {
    pub product_id: Uuid,
    pub name: String,
    pub shopify_product_id: String,
}

/// Best-effort batch result: `{success count, synced, errors}`.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SyncSummary {
    pub success: usize,
    pub synced: Vec<SyncedProduct>,
    pub errors: Vec<SyncError>,
}

/// Build the remote payload for one product: one variant per size x color
/// combination, or a single default variant when both axes are absent.
/// Variant quantities use the same floor division as the CSV exporter;
/// remainder units are dropped.
pub fn build_remote_product(
    product: &product::Model,
    vendor: &user::Model,
    public_base_url: &str,
) -> RemoteProduct {
    let sizes = parse_string_list(product.sizes.as_deref(), "sizes", product.id);
    let colors = parse_string_list(product.colors.as_deref(), "colors", product.id);
    let images = validate_images(&product.images, public_base_url, product.id);

    let price = format_price(&product.price);
    let id_prefix: String = product.id.to_string().chars().take(8).collect();

    let variants = if sizes.is_empty() && colors.is_empty() {
        vec![RemoteVariant {
            option1: None,
            option2: None,
            price: price.clone(),
            sku: product.sku.clone().unwrap_or_default(),
            inventory_management: "shopify".to_string(),
            inventory_quantity: i64::from(product.quantity),
            requires_shipping: product.delivery,
        }]
    } else {
        let size_axis: Vec<Option<&str>> = if sizes.is_empty() {
            vec![None]
        } else {
            sizes.iter().map(|s| Some(s.as_str())).collect()
        };
        let color_axis: Vec<Option<&str>> = if colors.is_empty() {
            vec![None]
        } else {
            colors.iter().map(|c| Some(c.as_str())).collect()
        };

        let combinations = (size_axis.len() * color_axis.len()) as i32;
        let variant_quantity = i64::from(product.quantity / combinations);

        let mut variants = Vec::with_capacity(combinations as usize);
        let mut index = 0usize;
        for size in &size_axis {
            for color in &color_axis {
                let (option1, option2) = match (size, color) {
                    (Some(size), Some(color)) => {
                        (Some((*size).to_string()), Some((*color).to_string()))
                    }
                    (Some(size), None) => (Some((*size).to_string()), None),
                    (None, Some(color)) => (Some((*color).to_string()), None),
                    (None, None) => (None, None),
                };
                variants.push(RemoteVariant {
                    option1,
                    option2,
                    price: price.clone(),
                    sku: format!("{}-{}", id_prefix, index),
                    inventory_management: "shopify".to_string(),
                    inventory_quantity: variant_quantity,
                    requires_shipping: product.delivery,
                });
                index += 1;
            }
        }
        variants
    };

    RemoteProduct {
        id: None,
        title: product.name.clone(),
        body_html: product.description.clone(),
        vendor: vendor.display_label().to_string(),
        product_type: product.category.clone(),
        tags: vendor_tags(vendor),
        status: "active".to_string(),
        variants,
        images: images.into_iter().map(|src| RemoteImage { src }).collect(),
    }
}

/// Thin HTTP client for the Shopify Admin product endpoints.
#[derive(Debug, Clone)]
pub struct SyncClient {
    client: Client,
}

impl SyncClient {
    pub fn new() -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                ServiceError::InternalError(format!("failed to construct sync client: {e}"))
            })?;

        Ok(Self::with_client(client))
    }

    /// Build from an existing client (useful for testing).
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn base_url(connection: &shopify_connection::Model) -> String {
        let store = connection.store_url.trim().trim_end_matches('/');
        if store.starts_with("http://") || store.starts_with("https://") {
            store.to_string()
        } else {
            format!("https://{}", store)
        }
    }

    fn headers(connection: &shopify_connection::Model) -> Result<HeaderMap, ServiceError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "X-Shopify-Access-Token",
            HeaderValue::from_str(&connection.access_token).map_err(|_| {
                ServiceError::ValidationError("invalid characters in access token".to_string())
            })?,
        );
        Ok(headers)
    }

    /// Find a remote product by exact title match.
    pub async fn find_product_by_title(
        &self,
        connection: &shopify_connection::Model,
        title: &str,
    ) -> Result<Option<i64>, ServiceError> {
        let url = format!(
            "{}/admin/api/{}/products.json",
            Self::base_url(connection),
            SHOPIFY_API_VERSION
        );

        let response = self
            .client
            .get(&url)
            .query(&[("title", title)])
            .headers(Self::headers(connection)?)
            .send()
            .await
            .map_err(|e| ServiceError::UpstreamFailure(format!("product lookup failed: {e}")))?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            ServiceError::UpstreamFailure(format!("failed to read lookup response: {e}"))
        })?;

        if !status.is_success() {
            return Err(ServiceError::UpstreamFailure(format!(
                "Shopify API error (status: {}): {}",
                status,
                String::from_utf8_lossy(&body)
            )));
        }

        let page: ProductListEnvelope = serde_json::from_slice(&body)
            .map_err(|e| ServiceError::UpstreamFailure(format!("unreadable lookup body: {e}")))?;

        // The title filter is a loose match upstream; require equality.
        Ok(page
            .products
            .into_iter()
            .find(|candidate| candidate.title.as_deref() == Some(title))
            .and_then(|candidate| candidate.id))
    }

    /// Create a remote product; returns the assigned remote id.
    pub async fn create_product(
        &self,
        connection: &shopify_connection::Model,
        payload: &RemoteProduct,
    ) -> Result<i64, ServiceError> {
        let url = format!(
            "{}/admin/api/{}/products.json",
            Self::base_url(connection),
            SHOPIFY_API_VERSION
        );

        let response = self
            .client
            .post(&url)
            .headers(Self::headers(connection)?)
            .json(&ProductEnvelope {
                product: payload.clone(),
            })
            .send()
            .await
            .map_err(|e| ServiceError::UpstreamFailure(format!("product create failed: {e}")))?;

        Self::read_product_id(response).await
    }

    /// Overwrite an existing remote product.
    pub async fn update_product(
        &self,
        connection: &shopify_connection::Model,
        remote_id: i64,
        payload: &RemoteProduct,
    ) -> Result<i64, ServiceError> {
        let url = format!(
            "{}/admin/api/{}/products/{}.json",
            Self::base_url(connection),
            SHOPIFY_API_VERSION,
            remote_id
        );

        let mut payload = payload.clone();
        payload.id = Some(remote_id);

        let response = self
            .client
            .put(&url)
            .headers(Self::headers(connection)?)
            .json(&ProductEnvelope { product: payload })
            .send()
            .await
            .map_err(|e| ServiceError::UpstreamFailure(format!("product update failed: {e}")))?;

        Self::read_product_id(response).await
    }

    async fn read_product_id(response: reqwest::Response) -> Result<i64, ServiceError> {
        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            ServiceError::UpstreamFailure(format!("failed to read response body: {e}"))
        })?;

        if !status.is_success() {
            return Err(ServiceError::UpstreamFailure(format!(
                "Shopify API error (status: {}): {}",
                status,
                String::from_utf8_lossy(&body)
            )));
        }

        let envelope: ProductRefEnvelope = serde_json::from_slice(&body)
            .map_err(|e| ServiceError::UpstreamFailure(format!("unreadable product body: {e}")))?;

        envelope.product.id.ok_or_else(|| {
            ServiceError::UpstreamFailure("remote product response carried no id".to_string())
        })
    }
}

/// Orchestrates a sync batch: loads the vendor's products, pushes them
/// sequentially, and records remote ids and sync timestamps.
pub struct ShopifySyncService {
    db_pool: Arc<DbPool>,
    client: SyncClient,
    connections: Arc<ShopifyConnectionService>,
    public_base_url: String,
}

impl ShopifySyncService {
    pub fn new(
        db_pool: Arc<DbPool>,
        client: SyncClient,
        connections: Arc<ShopifyConnectionService>,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            db_pool,
            client,
            connections,
            public_base_url: public_base_url.into(),
        }
    }

    /// Sync the vendor's products (optionally restricted to `product_ids`).
    /// Remote calls are sequential; one failure never aborts the batch.
    #[instrument(skip(self, vendor), fields(vendor_id = %vendor.id))]
    pub async fn sync_products(
        &self,
        vendor: &user::Model,
        product_ids: Option<Vec<Uuid>>,
    ) -> Result<SyncSummary, ServiceError> {
        let connection = self.connections.get_active(vendor.id).await?;

        let db = &*self.db_pool;
        let mut query = Product::find()
            .filter(product::Column::VendorId.eq(vendor.id))
            .order_by_desc(product::Column::CreatedAt);
        if let Some(ids) = &product_ids {
            query = query.filter(product::Column::Id.is_in(ids.clone()));
        }
        let products = query.all(db).await?;

        let mut summary = SyncSummary {
            success: 0,
            synced: Vec::new(),
            errors: Vec::new(),
        };

        for item in &products {
            match self.sync_one(&connection, item, vendor).await {
                Ok(remote_id) => {
                    summary.success += 1;
                    summary.synced.push(SyncedProduct {
                        product_id: item.id,
                        name: item.name.clone(),
                        shopify_product_id: remote_id.to_string(),
                    });
                }
                Err(err) => {
                    warn!(product_id = %item.id, error = %err, "Product sync failed");
                    summary.errors.push(SyncError {
                        product_id: item.id,
                        name: item.name.clone(),
                        message: err.response_message(),
                    });
                }
            }
        }

        if summary.success > 0 {
            self.connections.record_sync(connection.id).await?;
        }

        info!(
            success = summary.success,
            failed = summary.errors.len(),
            "Sync batch finished"
        );

        Ok(summary)
    }

    async fn sync_one(
        &self,
        connection: &shopify_connection::Model,
        item: &product::Model,
        vendor: &user::Model,
    ) -> Result<i64, ServiceError> {
        let payload = build_remote_product(item, vendor, &self.public_base_url);

        let remote_id = match self
            .client
            .find_product_by_title(connection, &item.name)
            .await?
        {
            Some(existing) => {
                self.client
                    .update_product(connection, existing, &payload)
                    .await?
            }
            None => self.client.create_product(connection, &payload).await?,
        };

        let db = &*self.db_pool;
        let mut active: product::ActiveModel = item.clone().into();
        active.shopify_product_id = Set(Some(remote_id.to_string()));
        active.last_synced_at = Set(Some(Utc::now()));
        active.update(db).await?;

        Ok(remote_id)
    }
}
