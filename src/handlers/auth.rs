use axum::{
    extract::{Json, State},
    response::IntoResponse,
    routing::{get, post, put},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::auth::{AuthRouterExt, AuthUser, TokenResponse};
use crate::entities::user;
use crate::errors::ApiError;
use crate::handlers::common::{
    created_response, map_service_error, success_response, validate_input,
};
use crate::services::users::{RegisterInput, UpdateProfileInput};
use crate::AppState;

/// Public account view; credential material never appears here.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
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
    pub created_at: DateTime<Utc>,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
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
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    pub business_name: Option<String>,
    pub business_address: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub legal_declaration: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub business_name: Option<String>,
    pub business_address: Option<String>,
    pub phone: Option<String>,
    pub document_url: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

/// Session plus the account it belongs to.
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    #[schema(value_type = Object)]
    pub token: TokenResponse,
    pub user: UserResponse,
}

/// Creates the router for account endpoints
pub fn auth_routes() -> Router<AppState> {
    let protected = Router::new()
        .route("/me", get(me))
        .route("/profile", put(update_profile))
        .route("/password", put(change_password))
        .with_auth();

    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .merge(protected)
}

/// Register a vendor account
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse)
    ),
    tag = "Auth"
)]
pub(crate) async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let account = state
        .services
        .users
        .register(RegisterInput {
            name: payload.name,
            email: payload.email,
            password: payload.password,
            business_name: payload.business_name,
            business_address: payload.business_address,
            phone: payload.phone,
            legal_declaration: payload.legal_declaration,
        })
        .await
        .map_err(map_service_error)?;

    let token = state
        .auth
        .generate_token(&account)
        .map_err(|e| ApiError::ServiceError(crate::errors::ServiceError::InternalError(e.to_string())))?;

    Ok(created_response(AuthResponse {
        token,
        user: UserResponse::from(account),
    }))
}

/// Exchange credentials for a session token
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = crate::errors::ErrorResponse)
    ),
    tag = "Auth"
)]
pub(crate) async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let account = state
        .services
        .users
        .authenticate(&payload.email, &payload.password)
        .await
        .map_err(map_service_error)?;

    let token = state
        .auth
        .generate_token(&account)
        .map_err(|e| ApiError::ServiceError(crate::errors::ServiceError::InternalError(e.to_string())))?;

    Ok(success_response(AuthResponse {
        token,
        user: UserResponse::from(account),
    }))
}

/// Current account profile
#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Current account", body = UserResponse),
        (status = 401, description = "Missing credential", body = crate::errors::ErrorResponse),
        (status = 403, description = "Invalid or expired credential", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Auth"
)]
pub(crate) async fn me(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let account = state
        .services
        .users
        .get_user(user.user_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(UserResponse::from(account)))
}

/// Update profile fields; unset fields keep previous values
#[utoipa::path(
    put,
    path = "/auth/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse)
    ),
    security(("Bearer" = [])),
    tag = "Auth"
)]
pub(crate) async fn update_profile(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let account = state
        .services
        .users
        .update_profile(
            user.user_id,
            UpdateProfileInput {
                name: payload.name,
                business_name: payload.business_name,
                business_address: payload.business_address,
                phone: payload.phone,
                document_url: payload.document_url,
            },
        )
        .await
        .map_err(map_service_error)?;

    Ok(success_response(UserResponse::from(account)))
}

/// Change the account password
#[utoipa::path(
    put,
    path = "/auth/password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 401, description = "Current password incorrect", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Auth"
)]
pub(crate) async fn change_password(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    state
        .services
        .users
        .change_password(user.user_id, &payload.current_password, &payload.new_password)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(serde_json::json!({
        "message": "Password changed"
    })))
}
