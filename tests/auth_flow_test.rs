mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn register_login_me_round_trip() {
    let app = TestApp::new().await;

    let (status, body, _) = app
        .request(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({
                "name": "Jordan Vendor",
                "email": "jordan@example.com",
                "password": "a-long-password",
                "business_name": "Jordan's Shop",
                "legal_declaration": true
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["email"], "jordan@example.com");
    assert!(body["user"].get("password_hash").is_none());

    let (status, body, _) = app
        .request(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({
                "email": "jordan@example.com",
                "password": "a-long-password"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"]["access_token"].as_str().unwrap().to_string();

    let (status, body, _) = app
        .request(Method::GET, "/auth/me", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "jordan@example.com");
    assert_eq!(body["is_admin"], false);
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let app = TestApp::new().await;

    let (status, _, _) = app.request(Method::GET, "/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn garbage_token_is_forbidden() {
    let app = TestApp::new().await;

    let (status, _, _) = app
        .request(Method::GET, "/auth/me", Some("not-a-real-token"), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let app = TestApp::new().await;
    app.register_vendor("casey@example.com").await;

    let (status, _, _) = app
        .request(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({
                "email": "casey@example.com",
                "password": "not-the-password"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Unknown email is indistinguishable from a wrong password.
    let (status, _, _) = app
        .request(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({
                "email": "nobody@example.com",
                "password": "whatever-password"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let app = TestApp::new().await;
    app.register_vendor("dup@example.com").await;

    let (status, _, _) = app
        .request(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({
                "name": "Second",
                "email": "dup@example.com",
                "password": "another-password"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn vendor_token_cannot_reach_admin_routes() {
    let app = TestApp::new().await;
    let (_, token) = app.register_vendor("plain@example.com").await;

    let (status, _, _) = app
        .request(Method::GET, "/api/v1/admin/stats", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn profile_update_is_partial() {
    let app = TestApp::new().await;
    let (_, token) = app.register_vendor("profile@example.com").await;

    let (status, body, _) = app
        .request(
            Method::PUT,
            "/auth/profile",
            Some(&token),
            Some(json!({ "phone": "+1 555 0100" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phone"], "+1 555 0100");
    // Untouched fields keep their values.
    assert_eq!(body["business_name"], "Test Goods Co");
}

#[tokio::test]
async fn password_change_requires_current_password() {
    let app = TestApp::new().await;
    let (_, token) = app.register_vendor("pw@example.com").await;

    let (status, _, _) = app
        .request(
            Method::PUT,
            "/auth/password",
            Some(&token),
            Some(json!({
                "current_password": "wrong-current",
                "new_password": "new-long-password"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, _) = app
        .request(
            Method::PUT,
            "/auth/password",
            Some(&token),
            Some(json!({
                "current_password": "correct-horse-battery",
                "new_password": "new-long-password"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = app
        .request(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({
                "email": "pw@example.com",
                "password": "new-long-password"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}
