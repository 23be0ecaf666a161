mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use rust_decimal_macros::dec;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vendora_api::services::products::CreateProductInput;

fn listing(name: &str) -> CreateProductInput {
    CreateProductInput {
        name: name.to_string(),
        category: "Apparel".to_string(),
        description: "Soft cotton tee".to_string(),
        price: dec!(25.00),
        quantity: 20,
        delivery: true,
        pickup_location: None,
        images: None,
        sizes: Some(vec!["S".into(), "M".into()]),
        colors: Some(vec!["Black".into()]),
        status: None,
        sku: None,
    }
}

#[tokio::test]
async fn sync_requires_an_active_connection() {
    let app = TestApp::new().await;
    let (_, token) = app.register_vendor("unconnected@example.com").await;

    let (status, body, _) = app
        .request(
            Method::POST,
            "/api/v1/shopify/sync",
            Some(&token),
            Some(json!({})),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("connect a store"));
}

#[tokio::test]
async fn connect_status_disconnect_round_trip() {
    let app = TestApp::new().await;
    let (_, token) = app.register_vendor("store-owner@example.com").await;

    let (status, body, _) = app
        .request(
            Method::POST,
            "/api/v1/shopify/connect",
            Some(&token),
            Some(json!({
                "store_url": "my-store.myshopify.com",
                "access_token": "shpat_secret_value"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["connected"], true);
    assert_eq!(body["active"], true);
    assert_eq!(body["store_url"], "my-store.myshopify.com");
    // The token must never be echoed back.
    assert!(body.get("access_token").is_none());

    let (status, body, _) = app
        .request(Method::DELETE, "/api/v1/shopify/disconnect", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["connected"], true);
    assert_eq!(body["active"], false);

    // Reconnecting reactivates the same row rather than creating another.
    let (status, body, _) = app
        .request(
            Method::POST,
            "/api/v1/shopify/connect",
            Some(&token),
            Some(json!({
                "store_url": "my-store.myshopify.com",
                "access_token": "shpat_rotated_value"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["active"], true);
}

#[tokio::test]
async fn sync_creates_missing_remote_products() {
    let app = TestApp::new().await;
    let (vendor, token) = app.register_vendor("sync-create@example.com").await;

    let created = app
        .state
        .services
        .products
        .create_product(vendor.id, listing("Stylish T-Shirt"))
        .await
        .unwrap();

    let remote = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/admin/api/2024-01/products.json"))
        .and(query_param("title", "Stylish T-Shirt"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "products": [] })))
        .expect(1)
        .mount(&remote)
        .await;

    Mock::given(method("POST"))
        .and(path("/admin/api/2024-01/products.json"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "product": { "id": 987654321, "title": "Stylish T-Shirt" }
        })))
        .expect(1)
        .mount(&remote)
        .await;

    app.state
        .services
        .shopify_connections
        .connect(vendor.id, remote.uri(), "shpat_test_token".into())
        .await
        .unwrap();

    let (status, body, _) = app
        .request(
            Method::POST,
            "/api/v1/shopify/sync",
            Some(&token),
            Some(json!({})),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], 1);
    assert_eq!(body["errors"].as_array().unwrap().len(), 0);
    assert_eq!(body["synced"][0]["shopify_product_id"], "987654321");

    // The remote id and sync timestamp are recorded on the product row.
    let refreshed = app
        .state
        .services
        .products
        .get_product(vendor.id, created.id)
        .await
        .unwrap();
    assert_eq!(refreshed.shopify_product_id.as_deref(), Some("987654321"));
    assert!(refreshed.last_synced_at.is_some());

    let (_, connection_status, _) = app
        .request(Method::GET, "/api/v1/shopify/status", Some(&token), None)
        .await;
    assert!(!connection_status["last_synced_at"].is_null());
}

#[tokio::test]
async fn sync_updates_existing_remote_products() {
    let app = TestApp::new().await;
    let (vendor, token) = app.register_vendor("sync-update@example.com").await;

    app.state
        .services
        .products
        .create_product(vendor.id, listing("Known Tee"))
        .await
        .unwrap();

    let remote = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/admin/api/2024-01/products.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "products": [{ "id": 111222333, "title": "Known Tee" }]
        })))
        .expect(1)
        .mount(&remote)
        .await;

    Mock::given(method("PUT"))
        .and(path("/admin/api/2024-01/products/111222333.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "product": { "id": 111222333, "title": "Known Tee" }
        })))
        .expect(1)
        .mount(&remote)
        .await;

    app.state
        .services
        .shopify_connections
        .connect(vendor.id, remote.uri(), "shpat_test_token".into())
        .await
        .unwrap();

    let (status, body, _) = app
        .request(
            Method::POST,
            "/api/v1/shopify/sync",
            Some(&token),
            Some(json!({})),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], 1);
    assert_eq!(body["synced"][0]["shopify_product_id"], "111222333");
}

#[tokio::test]
async fn one_failing_product_does_not_abort_the_batch() {
    let app = TestApp::new().await;
    let (vendor, token) = app.register_vendor("sync-partial@example.com").await;

    // Newest-first ordering: create "Bad Tee" second so it syncs first.
    app.state
        .services
        .products
        .create_product(vendor.id, listing("Good Tee"))
        .await
        .unwrap();
    app.state
        .services
        .products
        .create_product(vendor.id, listing("Bad Tee"))
        .await
        .unwrap();

    let remote = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/admin/api/2024-01/products.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "products": [] })))
        .mount(&remote)
        .await;

    // The remote rejects "Bad Tee" and accepts "Good Tee".
    Mock::given(method("POST"))
        .and(path("/admin/api/2024-01/products.json"))
        .and(wiremock::matchers::body_partial_json(
            json!({ "product": { "title": "Bad Tee" } }),
        ))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&remote)
        .await;

    Mock::given(method("POST"))
        .and(path("/admin/api/2024-01/products.json"))
        .and(wiremock::matchers::body_partial_json(
            json!({ "product": { "title": "Good Tee" } }),
        ))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "product": { "id": 444555666, "title": "Good Tee" }
        })))
        .mount(&remote)
        .await;

    app.state
        .services
        .shopify_connections
        .connect(vendor.id, remote.uri(), "shpat_test_token".into())
        .await
        .unwrap();

    let (status, body, _) = app
        .request(
            Method::POST,
            "/api/v1/shopify/sync",
            Some(&token),
            Some(json!({})),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], 1);
    assert_eq!(body["errors"].as_array().unwrap().len(), 1);
    assert_eq!(body["errors"][0]["name"], "Bad Tee");
    assert_eq!(body["synced"][0]["name"], "Good Tee");
}
