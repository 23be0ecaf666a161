use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Vendora API",
        version = "0.1.0",
        description = r#"
# Vendora Marketplace Back Office API

Back office for a multi-vendor marketplace: vendors register and manage up to
ten product listings; administrators review vendor documents, export the
catalog as CSV or in the Shopify bulk-import format, and vendors can sync
listings to a connected Shopify store.

## Authentication

All protected endpoints expect a bearer token:

```
Authorization: Bearer <your-jwt-token>
```

A missing credential yields 401; an invalid or expired one yields 403.

## Pagination

List endpoints accept `page` (default 1) and `limit` (default 10, max 100).
        "#,
        contact(
            name = "Vendora Support",
            email = "support@vendora.dev"
        ),
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Auth", description = "Registration, login, and profile endpoints"),
        (name = "Products", description = "Vendor product listing endpoints"),
        (name = "Admin", description = "Administrative reporting and export endpoints"),
        (name = "Shopify", description = "Remote store connection and sync endpoints")
    ),
    paths(
        // Auth
        crate::handlers::auth::register,
        crate::handlers::auth::login,
        crate::handlers::auth::me,
        crate::handlers::auth::update_profile,
        crate::handlers::auth::change_password,

        // Products
        crate::handlers::products::list_products,
        crate::handlers::products::create_product,
        crate::handlers::products::update_product,
        crate::handlers::products::delete_product,

        // Admin
        crate::handlers::admin::stats,
        crate::handlers::admin::list_users,
        crate::handlers::admin::verify_documents,
        crate::handlers::admin::delete_user,
        crate::handlers::admin::list_products,
        crate::handlers::admin::delete_product,
        crate::handlers::admin::export_generic,
        crate::handlers::admin::export_shopify,

        // Shopify
        crate::handlers::shopify::connect,
        crate::handlers::shopify::disconnect,
        crate::handlers::shopify::status,
        crate::handlers::shopify::sync_products,
    ),
    components(
        schemas(
            crate::handlers::auth::UserResponse,
            crate::handlers::auth::RegisterRequest,
            crate::handlers::auth::LoginRequest,
            crate::handlers::auth::UpdateProfileRequest,
            crate::handlers::auth::ChangePasswordRequest,
            crate::handlers::auth::AuthResponse,
            crate::handlers::products::ProductResponse,
            crate::handlers::products::CreateProductRequest,
            crate::handlers::products::UpdateProductRequest,
            crate::handlers::admin::AdminUserResponse,
            crate::handlers::admin::AdminProductResponse,
            crate::handlers::admin::VerifyDocumentsRequest,
            crate::handlers::shopify::ConnectRequest,
            crate::handlers::shopify::SyncRequest,
            crate::services::reports::AdminStats,
            crate::services::shopify::ConnectionStatus,
            crate::services::shopify::SyncSummary,
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
