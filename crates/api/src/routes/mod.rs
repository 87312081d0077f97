//! HTTP route handlers for the REST API.
//!
//! # Route Structure
//!
//! ```text
//! POST   /token                  - Exchange username+password for a bearer token
//!
//! # Users
//! POST   /users                  - Register (no auth)
//! GET    /users                  - Paginated list (admin)
//! GET    /users/me               - Caller's profile (active user)
//! GET    /users/{id}             - Fetch profile (self or admin)
//! PUT    /users/{id}             - Partial update (self or admin)
//! DELETE /users/{id}             - Delete (admin)
//!
//! # Products
//! POST   /products               - Create (admin)
//! GET    /products               - Paginated list with sort/filter (active user)
//! GET    /products/{id}          - Fetch (active user)
//! PUT    /products/{id}          - Partial update (admin)
//! DELETE /products/{id}          - Delete (admin)
//! PATCH  /products/{id}/stock    - Atomic stock decrement (admin)
//!
//! # Shopping carts (owner-only, roles do not bypass)
//! POST   /shopping-carts                         - Create own cart
//! GET    /shopping-carts/{id}                    - Fetch cart
//! GET    /shopping-carts/user/{user_id}          - Fetch cart by owner
//! POST   /shopping-carts/{id}/items              - Add item (merges quantities)
//! PUT    /shopping-carts/{id}/items/{product_id} - Set item quantity
//! DELETE /shopping-carts/{id}/items/{product_id} - Remove item
//! DELETE /shopping-carts/{id}/clear              - Empty the cart
//! DELETE /shopping-carts/{id}                    - Delete cart
//! ```

pub mod auth;
pub mod carts;
pub mod products;
pub mod users;

use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use crate::state::AppState;

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(users::register).get(users::list))
        .route("/me", get(users::me))
        .route(
            "/{id}",
            get(users::show).put(users::update).delete(users::remove),
        )
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(products::create).get(products::index))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::remove),
        )
        .route("/{id}/stock", patch(products::decrement_stock))
}

/// Create the shopping cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(carts::create))
        .route("/user/{user_id}", get(carts::show_by_owner))
        .route("/{id}", get(carts::show).delete(carts::remove))
        .route("/{id}/items", post(carts::add_item))
        .route(
            "/{id}/items/{product_id}",
            axum::routing::put(carts::update_item).delete(carts::remove_item),
        )
        .route("/{id}/clear", delete(carts::clear))
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Token exchange
        .route("/token", post(auth::issue_token))
        // User routes
        .nest("/users", user_routes())
        // Product routes
        .nest("/products", product_routes())
        // Shopping cart routes
        .nest("/shopping-carts", cart_routes())
}
