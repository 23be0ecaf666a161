use axum::{
    extract::{Json, State},
    response::IntoResponse,
    routing::{delete, get, post},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::auth::{AuthRouterExt, AuthUser};
use crate::errors::ApiError;
use crate::handlers::common::{
    map_service_error, success_response, validate_input,
};
use crate::AppState;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ConnectRequest {
    #[validate(length(min = 1, message = "store_url is required"))]
    pub store_url: String,
    #[validate(length(min = 1, message = "access_token is required"))]
    pub access_token: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SyncRequest {
    /// Restrict the batch to these products; defaults to every listing the
    /// caller owns.
    #[serde(default)]
    pub product_ids: Option<Vec<Uuid>>,
}

/// Creates the router for vendor Shopify endpoints
pub fn shopify_routes() -> Router<AppState> {
    Router::new()
        .route("/connect", post(connect))
        .route("/disconnect", delete(disconnect))
        .route("/status", get(status))
        .route("/sync", post(sync_products))
        .with_auth()
}

/// Store or replace the caller's store credentials
#[utoipa::path(
    post,
    path = "/api/v1/shopify/connect",
    request_body = ConnectRequest,
    responses(
        (status = 200, description = "Connection saved", body = crate::services::shopify::ConnectionStatus),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Shopify"
)]
pub(crate) async fn connect(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<ConnectRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    state
        .services
        .shopify_connections
        .connect(user.user_id, payload.store_url, payload.access_token)
        .await
        .map_err(map_service_error)?;

    // Re-read through the status view so the token never leaves the service.
    let status = state
        .services
        .shopify_connections
        .status(user.user_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(status))
}

/// Deactivate the caller's connection
#[utoipa::path(
    delete,
    path = "/api/v1/shopify/disconnect",
    responses(
        (status = 200, description = "Connection deactivated", body = crate::services::shopify::ConnectionStatus),
        (status = 404, description = "No connection", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Shopify"
)]
pub(crate) async fn disconnect(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .shopify_connections
        .disconnect(user.user_id)
        .await
        .map_err(map_service_error)?;

    let status = state
        .services
        .shopify_connections
        .status(user.user_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(status))
}

/// Connection presence, activity, and last sync time
#[utoipa::path(
    get,
    path = "/api/v1/shopify/status",
    responses(
        (status = 200, description = "Connection status", body = crate::services::shopify::ConnectionStatus)
    ),
    security(("Bearer" = [])),
    tag = "Shopify"
)]
pub(crate) async fn status(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let status = state
        .services
        .shopify_connections
        .status(user.user_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(status))
}

/// Push the caller's listings to the connected store. Best effort: one
/// product's failure is reported in the summary, not the batch's status.
#[utoipa::path(
    post,
    path = "/api/v1/shopify/sync",
    request_body = SyncRequest,
    responses(
        (status = 200, description = "Batch summary", body = crate::services::shopify::SyncSummary),
        (status = 400, description = "No active connection", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Shopify"
)]
pub(crate) async fn sync_products(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<SyncRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let vendor = state
        .services
        .users
        .get_user(user.user_id)
        .await
        .map_err(map_service_error)?;

    let summary = state
        .services
        .shopify_sync
        .sync_products(&vendor, payload.product_ids)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(summary))
}
