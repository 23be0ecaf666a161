// Not every test binary exercises every helper.
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;
use vendora_api::{
    auth::{AuthConfig, AuthService},
    config::AppConfig,
    db,
    entities::user,
    handlers::AppServices,
    services::shopify::SyncClient,
    AppState,
};

const TEST_JWT_SECRET: &str =
    "kq83hzfN2mXv7Lr0pQwYtJc5RgBdA1eUoS6iKfM9xnTZ4yWbG8sVhDuEjPlC0aOr";

/// Helper harness backed by a throwaway SQLite database with migrations
/// applied.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    db_path: PathBuf,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let db_path =
            std::env::temp_dir().join(format!("vendora_test_{}.db", Uuid::new_v4().simple()));

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            TEST_JWT_SECRET.to_string(),
            3600,
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations");

        let db_arc = Arc::new(pool);
        let auth_service = Arc::new(AuthService::new(AuthConfig::new(
            cfg.jwt_secret.clone(),
            Duration::from_secs(cfg.jwt_expiration as u64),
        )));

        let sync_client = SyncClient::new().expect("failed to build sync client");
        let services = AppServices::new(db_arc.clone(), auth_service.clone(), &cfg, sync_client);

        let state = AppState {
            db: db_arc,
            config: cfg,
            auth: auth_service,
            services,
        };

        let router = vendora_api::build_router(state.clone());

        Self {
            router,
            state,
            db_path,
        }
    }

    /// Register a vendor through the service layer; returns the account and
    /// a valid bearer token.
    pub async fn register_vendor(&self, email: &str) -> (user::Model, String) {
        let account = self
            .state
            .services
            .users
            .register(vendora_api::services::users::RegisterInput {
                name: "Test Vendor".to_string(),
                email: email.to_string(),
                password: "correct-horse-battery".to_string(),
                business_name: Some("Test Goods Co".to_string()),
                business_address: Some("1 Test Way, Testville".to_string()),
                phone: None,
                legal_declaration: true,
            })
            .await
            .expect("failed to register vendor");

        let token = self
            .state
            .auth
            .generate_token(&account)
            .expect("failed to issue token")
            .access_token;

        (account, token)
    }

    /// Promote an account to administrator directly in the store and issue a
    /// fresh token carrying the admin flag.
    pub async fn make_admin(&self, account: &user::Model) -> String {
        let mut model: user::ActiveModel = account.clone().into();
        model.is_admin = Set(true);
        let updated = model
            .update(&*self.state.db)
            .await
            .expect("failed to promote admin");

        self.state
            .auth
            .generate_token(&updated)
            .expect("failed to issue admin token")
            .access_token
    }

    /// Issue a JSON request against the app router.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value, axum::http::HeaderMap) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("request failed");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::String(
                String::from_utf8_lossy(&bytes).into_owned(),
            ))
        };

        (status, json, headers)
    }

    /// Fetch a raw (non-JSON) response body, for CSV downloads.
    pub async fn request_raw(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
    ) -> (StatusCode, String, axum::http::HeaderMap) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let response = self
            .router
            .clone()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .expect("request failed");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read body");

        (
            status,
            String::from_utf8_lossy(&bytes).into_owned(),
            headers,
        )
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_path);
    }
}
