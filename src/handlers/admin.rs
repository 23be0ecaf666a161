use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{delete, get, put},
    Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::AuthRouterExt;
use crate::entities::{product, user};
use crate::errors::ApiError;
use crate::handlers::common::{
    csv_attachment, map_service_error, no_content_response, success_response, PaginationParams,
};
use crate::services::csv::timestamped_filename;
use crate::{AppState, PaginatedResponse};

/// Account view for the admin console, with the vendor's listing count.
#[derive(Debug, Serialize, ToSchema)]
pub struct AdminUserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub business_name: Option<String>,
    pub business_address: Option<String>,
    pub phone: Option<String>,
    pub document_url: Option<String>,
    pub is_admin: bool,
    pub documents_verified: bool,
    pub legal_declaration: bool,
    pub product_count: u64,
    pub created_at: DateTime<Utc>,
}

impl AdminUserResponse {
    fn from_model(model: user::Model, product_count: u64) -> Self {
        Self {
            id: model.id,
            email: model.email,
            name: model.name,
            business_name: model.business_name,
            business_address: model.business_address,
            phone: model.phone,
            document_url: model.document_url,
            is_admin: model.is_admin,
            documents_verified: model.documents_verified,
            legal_declaration: model.legal_declaration,
            product_count,
            created_at: model.created_at,
        }
    }
}

/// Product view for the admin console, joined with its vendor.
#[derive(Debug, Serialize, ToSchema)]
pub struct AdminProductResponse {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub description: String,
    #[schema(value_type = String)]
    pub price: Decimal,
    pub quantity: i32,
    pub delivery: bool,
    pub status: String,
    pub shopify_product_id: Option<String>,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub vendor_id: Uuid,
    pub vendor_email: String,
    pub vendor_name: String,
    pub created_at: DateTime<Utc>,
}

impl AdminProductResponse {
    fn from_pair(product: product::Model, vendor: &user::Model) -> Self {
        Self {
            id: product.id,
            name: product.name,
            category: product.category,
            description: product.description,
            price: product.price,
            quantity: product.quantity,
            delivery: product.delivery,
            status: product.status,
            shopify_product_id: product.shopify_product_id,
            last_synced_at: product.last_synced_at,
            vendor_id: vendor.id,
            vendor_email: vendor.email.clone(),
            vendor_name: vendor.name.clone(),
            created_at: product.created_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyDocumentsRequest {
    pub verified: bool,
}

/// Creates the router for administrator endpoints
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/stats", get(stats))
        .route("/users", get(list_users))
        .route("/users/:id/verify", put(verify_documents))
        .route("/users/:id", delete(delete_user))
        .route("/products", get(list_products))
        .route("/products/:id", delete(delete_product))
        .route("/export", get(export_generic))
        .route("/export-shopify", get(export_shopify))
        .with_admin()
}

/// Marketplace totals
#[utoipa::path(
    get,
    path = "/api/v1/admin/stats",
    responses(
        (status = 200, description = "Totals", body = crate::services::reports::AdminStats)
    ),
    security(("Bearer" = [])),
    tag = "Admin"
)]
pub(crate) async fn stats(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let stats = state
        .services
        .reports
        .stats()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(stats))
}

/// All accounts with their listing counts
#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    params(PaginationParams),
    responses(
        (status = 200, description = "Account page", body = crate::PaginatedResponse<AdminUserResponse>)
    ),
    security(("Bearer" = [])),
    tag = "Admin"
)]
pub(crate) async fn list_users(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, ApiError> {
    let (accounts, total) = state
        .services
        .users
        .list_users(pagination.page, pagination.limit)
        .await
        .map_err(map_service_error)?;

    let ids: Vec<Uuid> = accounts.iter().map(|account| account.id).collect();
    let counts = state
        .services
        .reports
        .product_counts(&ids)
        .await
        .map_err(map_service_error)?;

    let limit = pagination.limit.clamp(1, 100);
    let total_pages = total.div_ceil(limit);

    Ok(success_response(PaginatedResponse {
        items: accounts
            .into_iter()
            .map(|account| {
                let count = counts.get(&account.id).copied().unwrap_or(0);
                AdminUserResponse::from_model(account, count)
            })
            .collect::<Vec<_>>(),
        total,
        page: pagination.page.max(1),
        limit,
        total_pages,
    }))
}

/// Record the outcome of a document review
#[utoipa::path(
    put,
    path = "/api/v1/admin/users/:id/verify",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = VerifyDocumentsRequest,
    responses(
        (status = 200, description = "Verification updated"),
        (status = 404, description = "User not found", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Admin"
)]
pub(crate) async fn verify_documents(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<VerifyDocumentsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = state
        .services
        .users
        .set_documents_verified(id, payload.verified)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(
        crate::handlers::auth::UserResponse::from(updated),
    ))
}

/// Remove an account; its products and connection cascade
#[utoipa::path(
    delete,
    path = "/api/v1/admin/users/:id",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "User not found", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Admin"
)]
pub(crate) async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .users
        .delete_user(id)
        .await
        .map_err(map_service_error)?;

    Ok(no_content_response())
}

/// All products joined with their vendors
#[utoipa::path(
    get,
    path = "/api/v1/admin/products",
    responses(
        (status = 200, description = "All products", body = [AdminProductResponse])
    ),
    security(("Bearer" = [])),
    tag = "Admin"
)]
pub(crate) async fn list_products(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let items = state
        .services
        .reports
        .products_with_vendors()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(
        items
            .into_iter()
            .map(|(product, vendor)| AdminProductResponse::from_pair(product, &vendor))
            .collect::<Vec<_>>(),
    ))
}

/// Remove any vendor's product
#[utoipa::path(
    delete,
    path = "/api/v1/admin/products/:id",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Admin"
)]
pub(crate) async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .products
        .delete_product_as_admin(id)
        .await
        .map_err(map_service_error)?;

    Ok(no_content_response())
}

/// Generic CSV export of every product
#[utoipa::path(
    get,
    path = "/api/v1/admin/export",
    responses(
        (status = 200, description = "CSV download", content_type = "text/csv")
    ),
    security(("Bearer" = [])),
    tag = "Admin"
)]
pub(crate) async fn export_generic(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let body = state
        .services
        .reports
        .export_generic_csv()
        .await
        .map_err(map_service_error)?;

    Ok(csv_attachment(
        body,
        &timestamped_filename("products_export"),
    ))
}

/// Shopify bulk-import CSV of every product
#[utoipa::path(
    get,
    path = "/api/v1/admin/export-shopify",
    responses(
        (status = 200, description = "CSV download", content_type = "text/csv")
    ),
    security(("Bearer" = [])),
    tag = "Admin"
)]
pub(crate) async fn export_shopify(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let items = state
        .services
        .reports
        .products_with_vendors()
        .await
        .map_err(map_service_error)?;

    let exporter =
        crate::services::shopify::CatalogExporter::new(state.config.public_base_url.clone());
    let body = exporter.export_csv(&items);

    Ok(csv_attachment(
        body,
        &timestamped_filename("shopify_products"),
    ))
}
