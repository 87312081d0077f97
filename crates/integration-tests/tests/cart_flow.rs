//! Cart lifecycle and ownership tests against a running API.
//!
//! These tests require a running `PostgreSQL` database, the API server,
//! and a CLI-provisioned admin account (see crate docs).
//!
//! Run with: cargo test -p clementine-integration-tests -- --ignored

use reqwest::Client;
use serde_json::Value;

use clementine_integration_tests::{admin_token, base_url, client, register_user, token_for};

/// Create a cart for the account and return its ID.
async fn create_cart(client: &Client, token: &str, user_id: &str) -> String {
    let resp = client
        .post(format!("{}/shopping-carts", base_url()))
        .bearer_auth(token)
        .json(&serde_json::json!({ "user_id": user_id }))
        .send()
        .await
        .expect("Failed to create cart");
    assert_eq!(resp.status().as_u16(), 201);

    let body: Value = resp.json().await.expect("Failed to parse cart");
    body["id"].as_str().expect("cart has id").to_string()
}

/// Create a product (admin) and return its ID.
async fn create_product(client: &Client, stock: i32) -> String {
    let admin = admin_token(client).await;
    let resp = client
        .post(format!("{}/products", base_url()))
        .bearer_auth(&admin)
        .json(&serde_json::json!({
            "name": "Cart Test Product",
            "description": "integration test product",
            "price": "4.20",
            "stock": stock,
            "category": "test",
        }))
        .send()
        .await
        .expect("Failed to create product");
    assert_eq!(resp.status().as_u16(), 201);

    let body: Value = resp.json().await.expect("Failed to parse product");
    body["id"].as_str().expect("product has id").to_string()
}

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_cart_item_round_trip() {
    let client = client();
    let base_url = base_url();
    let account = register_user(&client).await;
    let token = token_for(&client, &account.username, &account.password).await;
    let cart_id = create_cart(&client, &token, &account.id).await;
    let product_id = create_product(&client, 100).await;

    // add_item then get reflects the entry
    let resp = client
        .post(format!("{base_url}/shopping-carts/{cart_id}/items"))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "product_id": product_id, "quantity": 2 }))
        .send()
        .await
        .expect("Failed to add item");
    assert_eq!(resp.status().as_u16(), 200);

    let resp = client
        .get(format!("{base_url}/shopping-carts/{cart_id}"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to get cart");
    let cart: Value = resp.json().await.expect("Failed to parse cart");
    let items = cart["items"].as_array().expect("cart has items");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["product_id"], product_id.as_str());
    assert_eq!(items[0]["quantity"], 2);

    // update quantity
    let resp = client
        .put(format!(
            "{base_url}/shopping-carts/{cart_id}/items/{product_id}"
        ))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "quantity": 7 }))
        .send()
        .await
        .expect("Failed to update item");
    assert_eq!(resp.status().as_u16(), 200);
    let cart: Value = resp.json().await.expect("Failed to parse cart");
    assert_eq!(cart["items"][0]["quantity"], 7);

    // remove_item then get no longer contains the product
    let resp = client
        .delete(format!(
            "{base_url}/shopping-carts/{cart_id}/items/{product_id}"
        ))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to remove item");
    assert_eq!(resp.status().as_u16(), 200);

    let resp = client
        .get(format!("{base_url}/shopping-carts/{cart_id}"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to get cart");
    let cart: Value = resp.json().await.expect("Failed to parse cart");
    assert!(cart["items"].as_array().expect("items").is_empty());

    // removing again is a 404 (no matching entry)
    let resp = client
        .delete(format!(
            "{base_url}/shopping-carts/{cart_id}/items/{product_id}"
        ))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to re-remove item");
    assert_eq!(resp.status().as_u16(), 404);
}

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_add_item_merges_duplicate_products() {
    let client = client();
    let base_url = base_url();
    let account = register_user(&client).await;
    let token = token_for(&client, &account.username, &account.password).await;
    let cart_id = create_cart(&client, &token, &account.id).await;
    let product_id = create_product(&client, 100).await;

    for _ in 0..2 {
        let resp = client
            .post(format!("{base_url}/shopping-carts/{cart_id}/items"))
            .bearer_auth(&token)
            .json(&serde_json::json!({ "product_id": product_id, "quantity": 3 }))
            .send()
            .await
            .expect("Failed to add item");
        assert_eq!(resp.status().as_u16(), 200);
    }

    // One merged entry with the summed quantity, not two entries.
    let resp = client
        .get(format!("{base_url}/shopping-carts/{cart_id}"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to get cart");
    let cart: Value = resp.json().await.expect("Failed to parse cart");
    let items = cart["items"].as_array().expect("cart has items");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["quantity"], 6);
}

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_clear_then_get_yields_empty() {
    let client = client();
    let base_url = base_url();
    let account = register_user(&client).await;
    let token = token_for(&client, &account.username, &account.password).await;
    let cart_id = create_cart(&client, &token, &account.id).await;
    let product_id = create_product(&client, 100).await;

    let resp = client
        .post(format!("{base_url}/shopping-carts/{cart_id}/items"))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "product_id": product_id, "quantity": 4 }))
        .send()
        .await
        .expect("Failed to add item");
    assert_eq!(resp.status().as_u16(), 200);

    let resp = client
        .delete(format!("{base_url}/shopping-carts/{cart_id}/clear"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to clear cart");
    assert_eq!(resp.status().as_u16(), 200);
    let cart: Value = resp.json().await.expect("Failed to parse cart");
    assert!(cart["items"].as_array().expect("items").is_empty());

    // Clearing an already-empty cart still succeeds.
    let resp = client
        .delete(format!("{base_url}/shopping-carts/{cart_id}/clear"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to re-clear cart");
    assert_eq!(resp.status().as_u16(), 200);
}

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_cart_is_invisible_to_other_users_even_admins() {
    let client = client();
    let base_url = base_url();
    let owner = register_user(&client).await;
    let owner_token = token_for(&client, &owner.username, &owner.password).await;
    let cart_id = create_cart(&client, &owner_token, &owner.id).await;

    // Another regular user: 403 on read and on mutation.
    let outsider = register_user(&client).await;
    let outsider_token = token_for(&client, &outsider.username, &outsider.password).await;

    let resp = client
        .get(format!("{base_url}/shopping-carts/{cart_id}"))
        .bearer_auth(&outsider_token)
        .send()
        .await
        .expect("Failed to get cart as outsider");
    assert_eq!(resp.status().as_u16(), 403);

    let resp = client
        .delete(format!("{base_url}/shopping-carts/{cart_id}"))
        .bearer_auth(&outsider_token)
        .send()
        .await
        .expect("Failed to delete cart as outsider");
    assert_eq!(resp.status().as_u16(), 403);

    // An admin gets the same 403: ownership, not role, gates carts.
    let admin = admin_token(&client).await;
    let resp = client
        .get(format!("{base_url}/shopping-carts/{cart_id}"))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to get cart as admin");
    assert_eq!(resp.status().as_u16(), 403);
}

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_one_cart_per_user() {
    let client = client();
    let base_url = base_url();
    let account = register_user(&client).await;
    let token = token_for(&client, &account.username, &account.password).await;
    let _cart_id = create_cart(&client, &token, &account.id).await;

    // A second cart for the same owner is a conflict.
    let resp = client
        .post(format!("{base_url}/shopping-carts"))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "user_id": account.id }))
        .send()
        .await
        .expect("Failed to create second cart");
    assert_eq!(resp.status().as_u16(), 400);

    // Creating a cart for somebody else is forbidden.
    let other = register_user(&client).await;
    let resp = client
        .post(format!("{base_url}/shopping-carts"))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "user_id": other.id }))
        .send()
        .await
        .expect("Failed to create cart for other user");
    assert_eq!(resp.status().as_u16(), 403);

    // get-by-owner resolves the one cart.
    let resp = client
        .get(format!("{base_url}/shopping-carts/user/{}", account.id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to get cart by owner");
    assert_eq!(resp.status().as_u16(), 200);
}
