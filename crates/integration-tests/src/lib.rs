//! Integration tests for Clementine.
//!
//! # Running Tests
//!
//! ```bash
//! # Start PostgreSQL and apply migrations
//! cargo run -p clementine-cli -- migrate run
//!
//! # Create the admin the tests authenticate as
//! cargo run -p clementine-cli -- admin create \
//!     -u test-admin -e test-admin@example.com -p <password>
//!
//! # Start the API
//! cargo run -p clementine-api
//!
//! # Run the ignored end-to-end tests
//! cargo test -p clementine-integration-tests -- --ignored
//! ```
//!
//! # Environment
//!
//! - `API_BASE_URL` - where the API listens (default http://localhost:8000)
//! - `TEST_ADMIN_USERNAME` / `TEST_ADMIN_PASSWORD` - admin credentials
//!   created via the CLI (defaults: `test-admin` / `test-admin-password`)

use reqwest::Client;
use serde_json::Value;
use uuid::Uuid;

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:8000".to_string())
}

/// Plain HTTP client; authentication is per-request bearer headers.
#[must_use]
pub fn client() -> Client {
    Client::new()
}

/// A registered test account with its plaintext password kept around for
/// token exchange.
pub struct TestAccount {
    pub username: String,
    pub email: String,
    pub password: String,
    pub id: String,
}

/// Register a fresh user with a unique username/email.
///
/// # Panics
///
/// Panics if the request fails or the API refuses the registration.
pub async fn register_user(client: &Client) -> TestAccount {
    let suffix = Uuid::new_v4().simple().to_string();
    let username = format!("it-user-{}", &suffix[..12]);
    let email = format!("{username}@example.com");
    let password = "integration-password".to_string();

    let resp = client
        .post(format!("{}/users", base_url()))
        .json(&serde_json::json!({
            "username": username,
            "email": email,
            "password": password,
        }))
        .send()
        .await
        .expect("Failed to register test user");
    assert_eq!(resp.status().as_u16(), 201, "registration should return 201");

    let body: Value = resp.json().await.expect("Failed to parse registration body");
    let id = body["id"].as_str().expect("registration body has id").to_string();

    TestAccount {
        username,
        email,
        password,
        id,
    }
}

/// Exchange credentials for a bearer token.
///
/// # Panics
///
/// Panics if the token endpoint refuses the credentials.
pub async fn token_for(client: &Client, username: &str, password: &str) -> String {
    let resp = client
        .post(format!("{}/token", base_url()))
        .form(&[("username", username), ("password", password)])
        .send()
        .await
        .expect("Failed to request token");
    assert_eq!(resp.status().as_u16(), 200, "token exchange should return 200");

    let body: Value = resp.json().await.expect("Failed to parse token body");
    body["access_token"]
        .as_str()
        .expect("token body has access_token")
        .to_string()
}

/// Token for the CLI-provisioned admin account.
///
/// # Panics
///
/// Panics if the admin account is missing or the password is wrong.
pub async fn admin_token(client: &Client) -> String {
    let username =
        std::env::var("TEST_ADMIN_USERNAME").unwrap_or_else(|_| "test-admin".to_string());
    let password =
        std::env::var("TEST_ADMIN_PASSWORD").unwrap_or_else(|_| "test-admin-password".to_string());
    token_for(client, &username, &password).await
}
