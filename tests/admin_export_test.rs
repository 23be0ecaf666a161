mod common;

use axum::http::{header, Method, StatusCode};
use common::TestApp;
use rust_decimal_macros::dec;
use serde_json::json;
use vendora_api::services::products::CreateProductInput;

/// Minimal RFC-4180 parser used to round-trip escaped fields.
fn parse_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars().peekable();
    let mut quoted = false;

    while let Some(ch) = chars.next() {
        match ch {
            '"' if quoted => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    quoted = false;
                }
            }
            '"' => quoted = true,
            ',' if !quoted => {
                fields.push(std::mem::take(&mut current));
            }
            _ => current.push(ch),
        }
    }
    fields.push(current);
    fields
}

#[tokio::test]
async fn stats_reflect_marketplace_totals() {
    let app = TestApp::new().await;
    let (vendor, _) = app.register_vendor("stats-vendor@example.com").await;
    let (admin_account, _) = app.register_vendor("stats-admin@example.com").await;
    let admin_token = app.make_admin(&admin_account).await;

    app.state
        .services
        .products
        .create_product(
            vendor.id,
            CreateProductInput {
                name: "Counted".into(),
                category: "Misc".into(),
                description: "Counted in stats".into(),
                price: dec!(3.00),
                quantity: 1,
                delivery: false,
                pickup_location: None,
                images: None,
                sizes: None,
                colors: None,
                status: None,
                sku: None,
            },
        )
        .await
        .unwrap();

    let (status, body, _) = app
        .request(Method::GET, "/api/v1/admin/stats", Some(&admin_token), None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_users"], 2);
    assert_eq!(body["total_vendors"], 1);
    assert_eq!(body["total_products"], 1);
    assert_eq!(body["synced_products"], 0);
}

#[tokio::test]
async fn generic_export_escapes_and_round_trips() {
    let app = TestApp::new().await;
    let (vendor, _) = app.register_vendor("csv-vendor@example.com").await;
    let (admin_account, _) = app.register_vendor("csv-admin@example.com").await;
    let admin_token = app.make_admin(&admin_account).await;

    let tricky_name = "Mug, Large \"Deluxe\"\nSecond line";
    app.state
        .services
        .products
        .create_product(
            vendor.id,
            CreateProductInput {
                name: tricky_name.into(),
                category: "Kitchen".into(),
                description: "Holds coffee".into(),
                price: dec!(12.50),
                quantity: 3,
                delivery: true,
                pickup_location: None,
                images: None,
                sizes: None,
                colors: None,
                status: None,
                sku: None,
            },
        )
        .await
        .unwrap();

    let (status, body, headers) = app
        .request_raw(Method::GET, "/api/v1/admin/export", Some(&admin_token))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "text/csv");
    let disposition = headers[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.starts_with("attachment; filename=\"products_export_"));
    assert!(disposition.ends_with(".csv\""));

    // The embedded newline means the record spans two physical lines; glue
    // the record back together before parsing.
    let mut lines = body.lines();
    let header_line = lines.next().unwrap();
    assert_eq!(
        header_line,
        "id,name,category,description,price,quantity,delivery,vendor_email,vendor_name,created_at"
    );
    let record = lines.collect::<Vec<_>>().join("\n");
    let fields = parse_csv_line(&record);

    assert_eq!(fields[1], tricky_name);
    assert_eq!(fields[4], "12.50");
    assert_eq!(fields[6], "yes");
    assert_eq!(fields[7], "csv-vendor@example.com");
}

#[tokio::test]
async fn shopify_export_flattens_the_variant_matrix() {
    let app = TestApp::new().await;
    let (vendor, _) = app.register_vendor("variant-vendor@example.com").await;
    let (admin_account, _) = app.register_vendor("variant-admin@example.com").await;
    let admin_token = app.make_admin(&admin_account).await;

    app.state
        .services
        .products
        .create_product(
            vendor.id,
            CreateProductInput {
                name: "Stylish T-Shirt".into(),
                category: "Apparel".into(),
                description: "Soft cotton tee".into(),
                price: dec!(25.00),
                quantity: 20,
                delivery: true,
                pickup_location: None,
                images: None,
                sizes: Some(vec!["S".into(), "M".into(), "L".into(), "XL".into()]),
                colors: Some(vec!["Black".into(), "White".into()]),
                status: None,
                sku: None,
            },
        )
        .await
        .unwrap();

    let (status, body, headers) = app
        .request_raw(
            Method::GET,
            "/api/v1/admin/export-shopify",
            Some(&admin_token),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "text/csv");
    let disposition = headers[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.starts_with("attachment; filename=\"shopify_products_"));

    let lines: Vec<&str> = body.lines().collect();
    // 1 header + 4 sizes x 2 colors
    assert_eq!(lines.len(), 9);
    assert!(lines[0].starts_with("Handle,Title,Body (HTML)"));

    for row in &lines[1..] {
        let fields = parse_csv_line(row);
        assert_eq!(fields[0], "stylish-t-shirt");
        // Variant Inventory Qty is column 17 (zero-based 16): floor(20/8)=2.
        assert_eq!(fields[16], "2");
    }
}

#[tokio::test]
async fn deleting_a_vendor_cascades_to_products() {
    let app = TestApp::new().await;
    let (vendor, _) = app.register_vendor("cascade@example.com").await;
    let (admin_account, _) = app.register_vendor("cascade-admin@example.com").await;
    let admin_token = app.make_admin(&admin_account).await;

    app.state
        .services
        .products
        .create_product(
            vendor.id,
            CreateProductInput {
                name: "Orphan-to-be".into(),
                category: "Misc".into(),
                description: "Cascades away".into(),
                price: dec!(1.00),
                quantity: 1,
                delivery: false,
                pickup_location: None,
                images: None,
                sizes: None,
                colors: None,
                status: None,
                sku: None,
            },
        )
        .await
        .unwrap();

    let (status, _, _) = app
        .request(
            Method::DELETE,
            &format!("/api/v1/admin/users/{}", vendor.id),
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, stats, _) = app
        .request(Method::GET, "/api/v1/admin/stats", Some(&admin_token), None)
        .await;
    assert_eq!(stats["total_products"], 0);
}

#[tokio::test]
async fn admin_can_delete_any_product() {
    let app = TestApp::new().await;
    let (vendor, vendor_token) = app.register_vendor("moderated@example.com").await;
    let (admin_account, _) = app.register_vendor("moderator@example.com").await;
    let admin_token = app.make_admin(&admin_account).await;

    let created = app
        .state
        .services
        .products
        .create_product(
            vendor.id,
            CreateProductInput {
                name: "Contraband".into(),
                category: "Misc".into(),
                description: "To be moderated".into(),
                price: dec!(1.00),
                quantity: 1,
                delivery: false,
                pickup_location: None,
                images: None,
                sizes: None,
                colors: None,
                status: None,
                sku: None,
            },
        )
        .await
        .unwrap();

    let (status, _, _) = app
        .request(
            Method::DELETE,
            &format!("/api/v1/admin/products/{}", created.id),
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, listing, _) = app
        .request(Method::GET, "/api/v1/products", Some(&vendor_token), None)
        .await;
    assert_eq!(listing["total"], 0);
}

#[tokio::test]
async fn verification_flag_round_trips() {
    let app = TestApp::new().await;
    let (vendor, _) = app.register_vendor("reviewee@example.com").await;
    let (admin_account, _) = app.register_vendor("reviewer@example.com").await;
    let admin_token = app.make_admin(&admin_account).await;

    let (status, body, _) = app
        .request(
            Method::PUT,
            &format!("/api/v1/admin/users/{}/verify", vendor.id),
            Some(&admin_token),
            Some(json!({ "verified": true })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["documents_verified"], true);

    let (_, stats, _) = app
        .request(Method::GET, "/api/v1/admin/stats", Some(&admin_token), None)
        .await;
    assert_eq!(stats["verified_vendors"], 1);
}
