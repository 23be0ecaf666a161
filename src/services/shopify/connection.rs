use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::shopify_connection::{self, Entity as ShopifyConnection};
use crate::errors::ServiceError;

/// Public view of a vendor's remote-platform connection. The access token
/// never leaves the service layer.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ConnectionStatus {
    pub connected: bool,
    pub active: bool,
    pub store_url: Option<String>,
    pub last_synced_at: Option<DateTime<Utc>>,
}

/// Manages the single remote-sync credential row each vendor may hold.
pub struct ShopifyConnectionService {
    db_pool: Arc<DbPool>,
}

impl ShopifyConnectionService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Create or overwrite the vendor's connection, reactivating it.
    #[instrument(skip(self, access_token))]
    pub async fn connect(
        &self,
        vendor_id: Uuid,
        store_url: String,
        access_token: String,
    ) -> Result<shopify_connection::Model, ServiceError> {
        let db = &*self.db_pool;

        let store_url = store_url.trim().to_string();
        if store_url.is_empty() {
            return Err(ServiceError::ValidationError(
                "store_url is required".to_string(),
            ));
        }
        if access_token.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "access_token is required".to_string(),
            ));
        }

        let existing = ShopifyConnection::find()
            .filter(shopify_connection::Column::VendorId.eq(vendor_id))
            .one(db)
            .await?;

        let saved = match existing {
            Some(connection) => {
                let mut connection: shopify_connection::ActiveModel = connection.into();
                connection.store_url = Set(store_url);
                connection.access_token = Set(access_token);
                connection.active = Set(true);
                connection.updated_at = Set(Some(Utc::now()));
                connection.update(db).await?
            }
            None => {
                let connection = shopify_connection::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    vendor_id: Set(vendor_id),
                    store_url: Set(store_url),
                    access_token: Set(access_token),
                    active: Set(true),
                    last_synced_at: Set(None),
                    created_at: Set(Utc::now()),
                    updated_at: Set(None),
                };
                connection.insert(db).await?
            }
        };

        info!(vendor_id = %vendor_id, store_url = %saved.store_url, "Shopify connection saved");

        Ok(saved)
    }

    /// Deactivate the vendor's connection. The row is kept for audit.
    #[instrument(skip(self))]
    pub async fn disconnect(&self, vendor_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;

        let connection = ShopifyConnection::find()
            .filter(shopify_connection::Column::VendorId.eq(vendor_id))
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("No Shopify connection found".to_string()))?;

        let mut connection: shopify_connection::ActiveModel = connection.into();
        connection.active = Set(false);
        connection.updated_at = Set(Some(Utc::now()));
        connection.update(db).await?;

        info!(vendor_id = %vendor_id, "Shopify connection deactivated");

        Ok(())
    }

    /// Connection presence and activity for the vendor.
    #[instrument(skip(self))]
    pub async fn status(&self, vendor_id: Uuid) -> Result<ConnectionStatus, ServiceError> {
        let db = &*self.db_pool;

        let connection = ShopifyConnection::find()
            .filter(shopify_connection::Column::VendorId.eq(vendor_id))
            .one(db)
            .await?;

        Ok(match connection {
            Some(connection) => ConnectionStatus {
                connected: true,
                active: connection.active,
                store_url: Some(connection.store_url),
                last_synced_at: connection.last_synced_at,
            },
            None => ConnectionStatus {
                connected: false,
                active: false,
                store_url: None,
                last_synced_at: None,
            },
        })
    }

    /// The vendor's active connection, or a validation error when syncing is
    /// not possible.
    pub async fn get_active(
        &self,
        vendor_id: Uuid,
    ) -> Result<shopify_connection::Model, ServiceError> {
        let db = &*self.db_pool;

        ShopifyConnection::find()
            .filter(shopify_connection::Column::VendorId.eq(vendor_id))
            .filter(shopify_connection::Column::Active.eq(true))
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::ValidationError(
                    "No active Shopify connection; connect a store first".to_string(),
                )
            })
    }

    /// Stamp the connection after a completed sync batch.
    pub async fn record_sync(&self, connection_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;

        let connection = ShopifyConnection::find_by_id(connection_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Shopify connection not found".to_string()))?;

        let mut connection: shopify_connection::ActiveModel = connection.into();
        connection.last_synced_at = Set(Some(Utc::now()));
        connection.updated_at = Set(Some(Utc::now()));
        connection.update(db).await?;

        Ok(())
    }
}
