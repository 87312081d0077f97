//! Shopping cart route handlers.
//!
//! Every handler runs the same two-step guard: resolve the cart, then
//! `require_ownership` against the caller. Roles never bypass ownership -
//! an admin hitting someone else's cart gets the same 403 as anyone
//! else. The repository re-checks nothing; its mutations are conditional
//! statements that report `absent` when they match no row.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use clementine_core::{CartId, ProductId, Quantity, UserId};

use crate::db::carts::CartRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::{CartItem, ShoppingCart};
use crate::services::gate::{Principal, require_ownership};
use crate::state::AppState;
use crate::validation::ValidationErrors;

// =============================================================================
// Request / Response Types
// =============================================================================

/// Cart creation payload.
#[derive(Debug, Deserialize)]
pub struct CartCreateRequest {
    pub user_id: String,
}

/// Item addition payload.
#[derive(Debug, Deserialize)]
pub struct CartItemCreateRequest {
    pub product_id: String,
    pub quantity: i32,
}

impl CartItemCreateRequest {
    fn validate(self) -> std::result::Result<(ProductId, Quantity), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let product_id = errors.check("product_id", ProductId::parse(&self.product_id));
        let quantity = errors.check("quantity", Quantity::new(self.quantity));

        match (product_id, quantity) {
            (Some(p), Some(q)) => Ok((p, q)),
            _ => Err(errors),
        }
    }
}

/// Quantity update payload.
#[derive(Debug, Deserialize)]
pub struct CartItemUpdateRequest {
    pub quantity: i32,
}

/// Public view of a cart entry.
#[derive(Debug, Serialize)]
pub struct CartItemOut {
    pub product_id: ProductId,
    pub quantity: Quantity,
}

impl From<CartItem> for CartItemOut {
    fn from(item: CartItem) -> Self {
        Self {
            product_id: item.product_id,
            quantity: item.quantity,
        }
    }
}

/// Public view of a cart.
#[derive(Debug, Serialize)]
pub struct CartOut {
    pub id: CartId,
    pub user_id: UserId,
    pub items: Vec<CartItemOut>,
}

impl From<ShoppingCart> for CartOut {
    fn from(cart: ShoppingCart) -> Self {
        Self {
            id: cart.id,
            user_id: cart.user_id,
            items: cart.items.into_iter().map(Into::into).collect(),
        }
    }
}

// =============================================================================
// Guards
// =============================================================================

/// Resolve a cart and verify the caller owns it.
///
/// 404 if the cart is absent, 403 if it belongs to someone else.
async fn owned_cart(
    state: &AppState,
    principal: &Principal,
    cart_id: CartId,
) -> Result<ShoppingCart> {
    let carts = CartRepository::new(state.pool());
    let cart = carts
        .get(cart_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Shopping cart not found".to_owned()))?;

    require_ownership(principal, cart.user_id)?;

    Ok(cart)
}

// =============================================================================
// Handlers
// =============================================================================

/// `POST /shopping-carts` - create the caller's cart. Replies 201.
///
/// The body names the owner; it must be the caller (ownership is
/// absolute, so nobody creates carts for other users). A second cart for
/// the same owner is a 400 conflict.
pub async fn create(
    State(state): State<AppState>,
    RequireUser(principal): RequireUser,
    Json(payload): Json<CartCreateRequest>,
) -> Result<(StatusCode, Json<CartOut>)> {
    let mut errors = ValidationErrors::new();
    let owner_id = match errors.check("user_id", UserId::parse(&payload.user_id)) {
        Some(id) => id,
        None => return Err(errors.into()),
    };

    require_ownership(&principal, owner_id)?;

    let carts = CartRepository::new(state.pool());
    let cart = carts.create(owner_id).await?;

    Ok((StatusCode::CREATED, Json(cart.into())))
}

/// `GET /shopping-carts/{id}` - fetch a cart; owner only.
pub async fn show(
    State(state): State<AppState>,
    RequireUser(principal): RequireUser,
    Path(cart_id): Path<CartId>,
) -> Result<Json<CartOut>> {
    let cart = owned_cart(&state, &principal, cart_id).await?;
    Ok(Json(cart.into()))
}

/// `GET /shopping-carts/user/{user_id}` - fetch a cart by its owner;
/// owner only.
pub async fn show_by_owner(
    State(state): State<AppState>,
    RequireUser(principal): RequireUser,
    Path(user_id): Path<UserId>,
) -> Result<Json<CartOut>> {
    require_ownership(&principal, user_id)?;

    let carts = CartRepository::new(state.pool());
    let cart = carts
        .get_by_owner(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Shopping cart not found for this user".to_owned()))?;

    Ok(Json(cart.into()))
}

/// `POST /shopping-carts/{id}/items` - add units of a product; owner
/// only.
///
/// Adding a product already in the cart merges by summing quantities;
/// the cart never holds two entries for one product.
pub async fn add_item(
    State(state): State<AppState>,
    RequireUser(principal): RequireUser,
    Path(cart_id): Path<CartId>,
    Json(payload): Json<CartItemCreateRequest>,
) -> Result<Json<CartOut>> {
    let (product_id, quantity) = payload.validate()?;

    owned_cart(&state, &principal, cart_id).await?;

    let carts = CartRepository::new(state.pool());
    let cart = carts
        .add_item(cart_id, product_id, quantity)
        .await?
        .ok_or_else(|| AppError::NotFound("Shopping cart not found".to_owned()))?;

    Ok(Json(cart.into()))
}

/// `PUT /shopping-carts/{id}/items/{product_id}` - set an entry's
/// quantity; owner only.
pub async fn update_item(
    State(state): State<AppState>,
    RequireUser(principal): RequireUser,
    Path((cart_id, product_id)): Path<(CartId, ProductId)>,
    Json(payload): Json<CartItemUpdateRequest>,
) -> Result<Json<CartOut>> {
    let mut errors = ValidationErrors::new();
    let quantity = match errors.check("quantity", Quantity::new(payload.quantity)) {
        Some(q) => q,
        None => return Err(errors.into()),
    };

    owned_cart(&state, &principal, cart_id).await?;

    let carts = CartRepository::new(state.pool());
    let cart = carts
        .update_item_quantity(cart_id, product_id, quantity)
        .await?
        .ok_or_else(|| AppError::NotFound("Shopping cart or item not found".to_owned()))?;

    Ok(Json(cart.into()))
}

/// `DELETE /shopping-carts/{id}/items/{product_id}` - remove an entry;
/// owner only. Removing a product that is not in the cart is a 404.
pub async fn remove_item(
    State(state): State<AppState>,
    RequireUser(principal): RequireUser,
    Path((cart_id, product_id)): Path<(CartId, ProductId)>,
) -> Result<Json<CartOut>> {
    owned_cart(&state, &principal, cart_id).await?;

    let carts = CartRepository::new(state.pool());
    let cart = carts
        .remove_item(cart_id, product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Shopping cart or item not found".to_owned()))?;

    Ok(Json(cart.into()))
}

/// `DELETE /shopping-carts/{id}/clear` - empty the cart; owner only.
/// Clearing an already-empty cart succeeds.
pub async fn clear(
    State(state): State<AppState>,
    RequireUser(principal): RequireUser,
    Path(cart_id): Path<CartId>,
) -> Result<Json<CartOut>> {
    owned_cart(&state, &principal, cart_id).await?;

    let carts = CartRepository::new(state.pool());
    let cart = carts
        .clear(cart_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Shopping cart not found".to_owned()))?;

    Ok(Json(cart.into()))
}

/// `DELETE /shopping-carts/{id}` - delete the cart; owner only. Replies
/// 204.
pub async fn remove(
    State(state): State<AppState>,
    RequireUser(principal): RequireUser,
    Path(cart_id): Path<CartId>,
) -> Result<StatusCode> {
    owned_cart(&state, &principal, cart_id).await?;

    let carts = CartRepository::new(state.pool());
    let deleted = carts.delete(cart_id).await?;

    if !deleted {
        return Err(AppError::NotFound("Shopping cart not found".to_owned()));
    }

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_item_create_validation() {
        let payload = CartItemCreateRequest {
            product_id: "not-a-uuid".to_owned(),
            quantity: 0,
        };
        let errors = payload.validate().unwrap_err();
        assert_eq!(errors.errors.len(), 2);
    }

    #[test]
    fn test_item_create_validation_passes() {
        let product_id = ProductId::generate();
        let payload = CartItemCreateRequest {
            product_id: product_id.to_string(),
            quantity: 3,
        };
        let (parsed, quantity) = payload.validate().unwrap();
        assert_eq!(parsed, product_id);
        assert_eq!(quantity.as_i32(), 3);
    }

    #[test]
    fn test_cart_out_shape() {
        let cart = ShoppingCart {
            id: CartId::generate(),
            user_id: UserId::generate(),
            items: vec![CartItem {
                product_id: ProductId::generate(),
                quantity: Quantity::new(2).unwrap(),
            }],
            created_at: chrono::Utc::now(),
        };
        let out = CartOut::from(cart.clone());
        assert_eq!(out.id, cart.id);
        assert_eq!(out.items.len(), 1);
    }
}
