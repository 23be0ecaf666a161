use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::auth::{AuthRouterExt, AuthUser};
use crate::entities::product;
use crate::errors::ApiError;
use crate::handlers::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
    PaginationParams,
};
use crate::services::products::{CreateProductInput, UpdateProductInput};
use crate::services::shopify::export::parse_string_list;
use crate::{AppState, PaginatedResponse};

fn normalize_string(value: String) -> String {
    value.trim().to_string()
}

fn normalize_optional_string(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .and_then(|v| if v.is_empty() { None } else { Some(v) })
}

fn ensure_decimal_non_negative(value: &Decimal, field: &str) -> Result<(), ApiError> {
    if *value < Decimal::ZERO {
        Err(ApiError::ValidationError(format!(
            "{field} cannot be negative"
        )))
    } else {
        Ok(())
    }
}

fn ensure_i32_non_negative(value: i32, field: &str) -> Result<(), ApiError> {
    if value < 0 {
        Err(ApiError::ValidationError(format!(
            "{field} cannot be negative"
        )))
    } else {
        Ok(())
    }
}

/// Listing as returned to clients; option lists are parsed out of their
/// serialized form.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub description: String,
    #[schema(value_type = String)]
    pub price: Decimal,
    pub quantity: i32,
    pub delivery: bool,
    pub pickup_location: Option<String>,
    pub images: Vec<String>,
    pub sizes: Option<Vec<String>>,
    pub colors: Option<Vec<String>>,
    pub status: String,
    pub sku: Option<String>,
    pub shopify_product_id: Option<String>,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<product::Model> for ProductResponse {
    fn from(model: product::Model) -> Self {
        let images = parse_string_list(Some(model.images.as_str()), "images", model.id);
        let sizes = model
            .sizes
            .as_deref()
            .map(|raw| parse_string_list(Some(raw), "sizes", model.id));
        let colors = model
            .colors
            .as_deref()
            .map(|raw| parse_string_list(Some(raw), "colors", model.id));

        Self {
            id: model.id,
            name: model.name,
            category: model.category,
            description: model.description,
            price: model.price,
            quantity: model.quantity,
            delivery: model.delivery,
            pickup_location: model.pickup_location,
            images,
            sizes,
            colors,
            status: model.status,
            sku: model.sku,
            shopify_product_id: model.shopify_product_id,
            last_synced_at: model.last_synced_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateProductRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = Option<String>)]
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

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = Option<String>)]
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

/// Creates the router for vendor product endpoints
pub fn products_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products))
        .route("/", post(create_product))
        .route("/:id", put(update_product))
        .route("/:id", delete(delete_product))
        .with_auth()
}

/// List the caller's products, newest first
#[utoipa::path(
    get,
    path = "/api/v1/products",
    params(PaginationParams),
    responses(
        (status = 200, description = "Product page", body = crate::PaginatedResponse<ProductResponse>)
    ),
    security(("Bearer" = [])),
    tag = "Products"
)]
pub(crate) async fn list_products(
    user: AuthUser,
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, ApiError> {
    let (items, total) = state
        .services
        .products
        .list_products(user.user_id, pagination.page, pagination.limit)
        .await
        .map_err(map_service_error)?;

    let limit = pagination.limit.clamp(1, 100);
    let total_pages = total.div_ceil(limit);

    Ok(success_response(PaginatedResponse {
        items: items
            .into_iter()
            .map(ProductResponse::from)
            .collect::<Vec<_>>(),
        total,
        page: pagination.page.max(1),
        limit,
        total_pages,
    }))
}

/// Create a listing for the caller
#[utoipa::path(
    post,
    path = "/api/v1/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Missing required field", body = crate::errors::ErrorResponse),
        (status = 422, description = "Listing limit reached", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Products"
)]
pub(crate) async fn create_product(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let name = payload
        .name
        .map(normalize_string)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::ValidationError("name is required".to_string()))?;
    let category = payload
        .category
        .map(normalize_string)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::ValidationError("category is required".to_string()))?;
    let description = payload
        .description
        .map(normalize_string)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::ValidationError("description is required".to_string()))?;
    let price = payload
        .price
        .ok_or_else(|| ApiError::ValidationError("price is required".to_string()))?;
    let quantity = payload
        .quantity
        .ok_or_else(|| ApiError::ValidationError("quantity is required".to_string()))?;
    let delivery = payload
        .delivery
        .ok_or_else(|| ApiError::ValidationError("delivery must be set explicitly".to_string()))?;

    ensure_decimal_non_negative(&price, "price")?;
    ensure_i32_non_negative(quantity, "quantity")?;

    let created = state
        .services
        .products
        .create_product(
            user.user_id,
            CreateProductInput {
                name,
                category,
                description,
                price,
                quantity,
                delivery,
                pickup_location: normalize_optional_string(payload.pickup_location),
                images: payload.images,
                sizes: payload.sizes,
                colors: payload.colors,
                status: normalize_optional_string(payload.status),
                sku: normalize_optional_string(payload.sku),
            },
        )
        .await
        .map_err(map_service_error)?;

    Ok(created_response(ProductResponse::from(created)))
}

/// Update one of the caller's listings; unset fields keep previous values
#[utoipa::path(
    put,
    path = "/api/v1/products/:id",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Products"
)]
pub(crate) async fn update_product(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let name = payload
        .name
        .map(normalize_string)
        .map(|value| {
            if value.is_empty() {
                Err(ApiError::ValidationError(
                    "name cannot be blank".to_string(),
                ))
            } else {
                Ok(value)
            }
        })
        .transpose()?;

    if let Some(ref value) = payload.price {
        ensure_decimal_non_negative(value, "price")?;
    }
    if let Some(value) = payload.quantity {
        ensure_i32_non_negative(value, "quantity")?;
    }

    let updated = state
        .services
        .products
        .update_product(
            user.user_id,
            id,
            UpdateProductInput {
                name,
                category: normalize_optional_string(payload.category),
                description: normalize_optional_string(payload.description),
                price: payload.price,
                quantity: payload.quantity,
                delivery: payload.delivery,
                pickup_location: normalize_optional_string(payload.pickup_location),
                images: payload.images,
                sizes: payload.sizes,
                colors: payload.colors,
                status: normalize_optional_string(payload.status),
                sku: normalize_optional_string(payload.sku),
            },
        )
        .await
        .map_err(map_service_error)?;

    Ok(success_response(ProductResponse::from(updated)))
}

/// Delete one of the caller's listings
#[utoipa::path(
    delete,
    path = "/api/v1/products/:id",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Products"
)]
pub(crate) async fn delete_product(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .products
        .delete_product(user.user_id, id)
        .await
        .map_err(map_service_error)?;

    Ok(no_content_response())
}
