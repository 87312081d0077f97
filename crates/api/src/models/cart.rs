//! Shopping cart domain types.

use chrono::{DateTime, Utc};

use clementine_core::{CartId, ProductId, Quantity, UserId};

/// A shopping cart (domain type).
///
/// The owning user is set at creation and never changes; every access
/// path re-checks it. Items are keyed by product ID with at most one
/// entry per product.
#[derive(Debug, Clone)]
pub struct ShoppingCart {
    /// Unique cart ID.
    pub id: CartId,
    /// Owning user; immutable after creation.
    pub user_id: UserId,
    /// Item entries, at most one per product.
    pub items: Vec<CartItem>,
    /// When the cart was created.
    pub created_at: DateTime<Utc>,
}

impl ShoppingCart {
    /// Find the item entry for a product, if present.
    #[must_use]
    pub fn item(&self, product_id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|i| i.product_id == product_id)
    }
}

/// A single cart entry (embedded in its cart, no independent identity).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItem {
    /// Product this entry refers to.
    pub product_id: ProductId,
    /// Units of the product in the cart, always positive.
    pub quantity: Quantity,
}
