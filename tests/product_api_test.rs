mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use rust_decimal_macros::dec;
use serde_json::json;
use vendora_api::services::products::CreateProductInput;

fn sample_input(name: &str) -> CreateProductInput {
    CreateProductInput {
        name: name.to_string(),
        category: "General".to_string(),
        description: "A test listing".to_string(),
        price: dec!(9.99),
        quantity: 5,
        delivery: true,
        pickup_location: None,
        images: None,
        sizes: None,
        colors: None,
        status: None,
        sku: None,
    }
}

#[tokio::test]
async fn create_product_via_api() {
    let app = TestApp::new().await;
    let (_, token) = app.register_vendor("maker@example.com").await;

    let (status, body, _) = app
        .request(
            Method::POST,
            "/api/v1/products",
            Some(&token),
            Some(json!({
                "name": "Walnut Cutting Board",
                "category": "Kitchen",
                "description": "End-grain walnut board",
                "price": 65.0,
                "quantity": 4,
                "delivery": true,
                "images": ["https://cdn.example.com/board.jpg"],
                "sizes": ["Small", "Large"]
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Walnut Cutting Board");
    assert_eq!(body["status"], "active");
    assert_eq!(body["sizes"], json!(["Small", "Large"]));
    assert_eq!(body["images"], json!(["https://cdn.example.com/board.jpg"]));
}

#[tokio::test]
async fn create_requires_explicit_delivery_flag() {
    let app = TestApp::new().await;
    let (_, token) = app.register_vendor("strict@example.com").await;

    let (status, body, _) = app
        .request(
            Method::POST,
            "/api/v1/products",
            Some(&token),
            Some(json!({
                "name": "Mystery Box",
                "category": "Misc",
                "description": "No delivery flag",
                "price": 5,
                "quantity": 1
            })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("delivery"));
}

#[tokio::test]
async fn eleventh_product_hits_the_cap() {
    let app = TestApp::new().await;
    let (vendor, token) = app.register_vendor("prolific@example.com").await;

    for i in 0..10 {
        app.state
            .services
            .products
            .create_product(vendor.id, sample_input(&format!("Listing {i}")))
            .await
            .expect("creation under the cap should succeed");
    }

    let (status, body, _) = app
        .request(
            Method::POST,
            "/api/v1/products",
            Some(&token),
            Some(json!({
                "name": "One Too Many",
                "category": "Misc",
                "description": "Over the cap",
                "price": 1,
                "quantity": 1,
                "delivery": false
            })),
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["message"].as_str().unwrap().contains("at most 10"));
}

#[tokio::test]
async fn listing_pagination_math() {
    let app = TestApp::new().await;
    let (vendor, token) = app.register_vendor("pager@example.com").await;

    for i in 0..10 {
        app.state
            .services
            .products
            .create_product(vendor.id, sample_input(&format!("Listing {i}")))
            .await
            .unwrap();
    }

    let (status, body, _) = app
        .request(
            Method::GET,
            "/api/v1/products?page=1&limit=4",
            Some(&token),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 10);
    assert_eq!(body["limit"], 4);
    assert_eq!(body["total_pages"], 3);
    assert_eq!(body["items"].as_array().unwrap().len(), 4);

    let (_, last_page, _) = app
        .request(
            Method::GET,
            "/api/v1/products?page=3&limit=4",
            Some(&token),
            None,
        )
        .await;
    assert_eq!(last_page["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn listing_cache_is_refreshed_after_mutation() {
    let app = TestApp::new().await;
    let (vendor, token) = app.register_vendor("cached@example.com").await;

    app.state
        .services
        .products
        .create_product(vendor.id, sample_input("First"))
        .await
        .unwrap();

    // Prime the cache.
    let (_, first_read, _) = app
        .request(Method::GET, "/api/v1/products", Some(&token), None)
        .await;
    assert_eq!(first_read["total"], 1);

    // Mutate, then read again: the cached page must have been invalidated.
    app.state
        .services
        .products
        .create_product(vendor.id, sample_input("Second"))
        .await
        .unwrap();

    let (_, second_read, _) = app
        .request(Method::GET, "/api/v1/products", Some(&token), None)
        .await;
    assert_eq!(second_read["total"], 2);
}

#[tokio::test]
async fn partial_update_keeps_unset_fields() {
    let app = TestApp::new().await;
    let (vendor, token) = app.register_vendor("updater@example.com").await;

    let created = app
        .state
        .services
        .products
        .create_product(vendor.id, sample_input("Original"))
        .await
        .unwrap();

    let (status, body, _) = app
        .request(
            Method::PUT,
            &format!("/api/v1/products/{}", created.id),
            Some(&token),
            Some(json!({ "price": 19.5 })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Original");
    assert_eq!(body["quantity"], 5);
    assert_eq!(body["price"], json!("19.5"));
}

#[tokio::test]
async fn foreign_products_are_invisible() {
    let app = TestApp::new().await;
    let (owner, _) = app.register_vendor("owner@example.com").await;
    let (_, intruder_token) = app.register_vendor("intruder@example.com").await;

    let created = app
        .state
        .services
        .products
        .create_product(owner.id, sample_input("Private"))
        .await
        .unwrap();

    let (status, _, _) = app
        .request(
            Method::PUT,
            &format!("/api/v1/products/{}", created.id),
            Some(&intruder_token),
            Some(json!({ "name": "Hijacked" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = app
        .request(
            Method::DELETE,
            &format!("/api/v1/products/{}", created.id),
            Some(&intruder_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn second_delete_reports_not_found() {
    let app = TestApp::new().await;
    let (vendor, token) = app.register_vendor("deleter@example.com").await;

    let created = app
        .state
        .services
        .products
        .create_product(vendor.id, sample_input("Ephemeral"))
        .await
        .unwrap();

    let uri = format!("/api/v1/products/{}", created.id);

    let (status, _, _) = app.request(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _, _) = app.request(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
