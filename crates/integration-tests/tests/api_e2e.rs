//! End-to-end scenario tests against a running API.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The API server running (cargo run -p clementine-api)
//! - An admin account provisioned via the CLI (see crate docs)
//!
//! Run with: cargo test -p clementine-integration-tests -- --ignored

use serde_json::Value;

use clementine_integration_tests::{admin_token, base_url, client, register_user, token_for};

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_register_token_me_flow() {
    let client = client();
    let base_url = base_url();

    // Register -> 201 (covered inside the helper)
    let account = register_user(&client).await;

    // Exchange credentials for a bearer token -> 200
    let token = token_for(&client, &account.username, &account.password).await;

    // GET /users/me with the token -> 200, matching the registered user
    let resp = client
        .get(format!("{base_url}/users/me"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to get /users/me");
    assert_eq!(resp.status().as_u16(), 200);

    let body: Value = resp.json().await.expect("Failed to parse /users/me body");
    assert_eq!(body["username"], account.username.as_str());
    assert_eq!(body["email"], account.email.as_str());
    assert_eq!(body["role"], "user");
    assert_eq!(body["is_active"], true);

    // GET /users/me without a token -> 401
    let resp = client
        .get(format!("{base_url}/users/me"))
        .send()
        .await
        .expect("Failed to get /users/me unauthenticated");
    assert_eq!(resp.status().as_u16(), 401);
    assert!(resp.headers().contains_key("www-authenticate"));
}

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_token_rejects_wrong_password() {
    let client = client();
    let account = register_user(&client).await;

    let resp = client
        .post(format!("{}/token", base_url()))
        .form(&[
            ("username", account.username.as_str()),
            ("password", "definitely-not-it"),
        ])
        .send()
        .await
        .expect("Failed to request token");
    assert_eq!(resp.status().as_u16(), 401);
}

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_duplicate_email_is_rejected() {
    let client = client();
    let base_url = base_url();
    let account = register_user(&client).await;

    // Same email, different username -> 400
    let resp = client
        .post(format!("{base_url}/users"))
        .json(&serde_json::json!({
            "username": format!("{}-again", account.username),
            "email": account.email,
            "password": "another-password",
        }))
        .send()
        .await
        .expect("Failed to register duplicate");
    assert_eq!(resp.status().as_u16(), 400);

    let body: Value = resp.json().await.expect("Failed to parse body");
    assert_eq!(body["detail"], "email already registered");
}

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_stock_decrement_rejects_insufficient() {
    let client = client();
    let base_url = base_url();
    let admin = admin_token(&client).await;

    // Admin creates a product with stock=10 -> 201
    let resp = client
        .post(format!("{base_url}/products"))
        .bearer_auth(&admin)
        .json(&serde_json::json!({
            "name": "Stock Probe",
            "description": "integration test product",
            "price": "9.99",
            "stock": 10,
            "category": "test",
        }))
        .send()
        .await
        .expect("Failed to create product");
    assert_eq!(resp.status().as_u16(), 201);
    let product: Value = resp.json().await.expect("Failed to parse product");
    let product_id = product["id"].as_str().expect("product has id");

    // Decrement by 11 -> 400 (insufficient), stock untouched
    let resp = client
        .patch(format!("{base_url}/products/{product_id}/stock?quantity=11"))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to patch stock");
    assert_eq!(resp.status().as_u16(), 400);

    // Decrement by 5 -> 200, stock is now 5
    let resp = client
        .patch(format!("{base_url}/products/{product_id}/stock?quantity=5"))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to patch stock");
    assert_eq!(resp.status().as_u16(), 200);

    let resp = client
        .get(format!("{base_url}/products/{product_id}"))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to fetch product");
    let body: Value = resp.json().await.expect("Failed to parse product");
    assert_eq!(body["stock"], 5);
}

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_stock_decrement_is_safe_under_concurrency() {
    let client = client();
    let base_url = base_url();
    let admin = admin_token(&client).await;

    // stock=10, 8 concurrent decrements of 3: at most 3 can succeed.
    let resp = client
        .post(format!("{base_url}/products"))
        .bearer_auth(&admin)
        .json(&serde_json::json!({
            "name": "Concurrency Probe",
            "description": "integration test product",
            "price": "1.00",
            "stock": 10,
            "category": "test",
        }))
        .send()
        .await
        .expect("Failed to create product");
    assert_eq!(resp.status().as_u16(), 201);
    let product: Value = resp.json().await.expect("Failed to parse product");
    let product_id = product["id"].as_str().expect("product has id").to_string();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let client = client.clone();
        let admin = admin.clone();
        let url = format!("{base_url}/products/{product_id}/stock?quantity=3");
        handles.push(tokio::spawn(async move {
            let resp = client
                .patch(url)
                .bearer_auth(&admin)
                .send()
                .await
                .expect("Failed to patch stock");
            resp.status().as_u16() == 200
        }));
    }

    let mut successes = 0;
    for handle in handles {
        if handle.await.expect("task panicked") {
            successes += 1;
        }
    }
    assert!(successes <= 3, "at most floor(10/3) decrements may succeed");

    let resp = client
        .get(format!("{base_url}/products/{product_id}"))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to fetch product");
    let body: Value = resp.json().await.expect("Failed to parse product");
    let stock = body["stock"].as_i64().expect("stock is a number");
    assert_eq!(stock, 10 - 3 * i64::from(successes));
    assert!(stock >= 0);
}

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_catalog_writes_require_admin() {
    let client = client();
    let base_url = base_url();
    let account = register_user(&client).await;
    let token = token_for(&client, &account.username, &account.password).await;

    let resp = client
        .post(format!("{base_url}/products"))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "name": "Should Not Exist",
            "description": "regular users cannot create products",
            "price": "1.00",
            "stock": 1,
            "category": "test",
        }))
        .send()
        .await
        .expect("Failed to post product");
    assert_eq!(resp.status().as_u16(), 403);
}

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_user_listing_requires_admin() {
    let client = client();
    let base_url = base_url();
    let account = register_user(&client).await;
    let token = token_for(&client, &account.username, &account.password).await;

    let resp = client
        .get(format!("{base_url}/users"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to list users");
    assert_eq!(resp.status().as_u16(), 403);

    let admin = admin_token(&client).await;
    let resp = client
        .get(format!("{base_url}/users?skip=0&limit=5"))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to list users as admin");
    assert_eq!(resp.status().as_u16(), 200);
}
