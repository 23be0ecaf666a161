pub mod admin;
pub mod auth;
pub mod common;
pub mod products;
pub mod shopify;

use std::sync::Arc;
use std::time::Duration;

use crate::auth::AuthService;
use crate::cache::InMemoryCache;
use crate::config::AppConfig;
use crate::db::DbPool;
use crate::services::shopify::{ShopifyConnectionService, ShopifySyncService, SyncClient};
use crate::services::{ProductService, ReportService, UserService};

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub users: Arc<UserService>,
    pub products: Arc<ProductService>,
    pub reports: Arc<ReportService>,
    pub shopify_connections: Arc<ShopifyConnectionService>,
    pub shopify_sync: Arc<ShopifySyncService>,
}

impl AppServices {
    /// Wire the service container from configuration. The sync client may be
    /// injected for testing.
    pub fn new(
        db_pool: Arc<DbPool>,
        auth_service: Arc<AuthService>,
        config: &AppConfig,
        sync_client: SyncClient,
    ) -> Self {
        let cache = Arc::new(InMemoryCache::with_capacity(config.cache.capacity));

        let users = Arc::new(UserService::new(db_pool.clone(), auth_service));
        let products = Arc::new(ProductService::new(
            db_pool.clone(),
            cache,
            Duration::from_secs(config.cache.default_ttl_secs),
            u64::from(config.product_limit_per_vendor),
        ));
        let reports = Arc::new(ReportService::new(db_pool.clone()));
        let shopify_connections = Arc::new(ShopifyConnectionService::new(db_pool.clone()));
        let shopify_sync = Arc::new(ShopifySyncService::new(
            db_pool,
            sync_client,
            shopify_connections.clone(),
            config.public_base_url.clone(),
        ));

        Self {
            users,
            products,
            reports,
            shopify_connections,
            shopify_sync,
        }
    }
}
