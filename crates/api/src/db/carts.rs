//! Shopping cart repository: the cart engine's storage layer.
//!
//! A cart is one `shopping_cart` row plus its `cart_item` rows, keyed by
//! `(cart_id, product_id)` so the store itself enforces "at most one
//! entry per product". Every mutation is a single conditional statement;
//! a statement that matched nothing signals `absent` (`None`), never an
//! error. Ownership is checked by callers through the access gate before
//! any of these run; the store only guarantees the per-statement
//! atomicity.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use clementine_core::{CartId, ProductId, Quantity, UserId};

use super::RepositoryError;
use crate::models::{CartItem, ShoppingCart};

#[derive(sqlx::FromRow)]
struct CartRow {
    id: CartId,
    user_id: UserId,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct ItemRow {
    product_id: ProductId,
    quantity: Quantity,
}

/// Repository for shopping cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create an empty cart owned by `owner_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the owner already has a
    /// cart, `RepositoryError::Database` for other failures.
    pub async fn create(&self, owner_id: UserId) -> Result<ShoppingCart, RepositoryError> {
        let row = sqlx::query_as::<_, CartRow>(
            "INSERT INTO shopping_cart (id, user_id) VALUES ($1, $2) \
             RETURNING id, user_id, created_at",
        )
        .bind(CartId::generate())
        .bind(owner_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("user already has a cart".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        Ok(ShoppingCart {
            id: row.id,
            user_id: row.user_id,
            items: Vec::new(),
            created_at: row.created_at,
        })
    }

    /// Get a cart with its items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, cart_id: CartId) -> Result<Option<ShoppingCart>, RepositoryError> {
        let row = sqlx::query_as::<_, CartRow>(
            "SELECT id, user_id, created_at FROM shopping_cart WHERE id = $1",
        )
        .bind(cart_id)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some(self.load_items(r).await?)),
            None => Ok(None),
        }
    }

    /// Get the cart owned by `owner_id`, if any.
    ///
    /// Owners have at most one cart (unique index), so this is total.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_by_owner(
        &self,
        owner_id: UserId,
    ) -> Result<Option<ShoppingCart>, RepositoryError> {
        let row = sqlx::query_as::<_, CartRow>(
            "SELECT id, user_id, created_at FROM shopping_cart WHERE user_id = $1",
        )
        .bind(owner_id)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some(self.load_items(r).await?)),
            None => Ok(None),
        }
    }

    /// Add units of a product to a cart, merging with any existing entry.
    ///
    /// One atomic upsert: a second entry for the same product is
    /// impossible, and two concurrent adds both land (the store sums
    /// them). Returns the refreshed cart, or `None` if the cart does not
    /// exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn add_item(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        quantity: Quantity,
    ) -> Result<Option<ShoppingCart>, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO cart_item (cart_id, product_id, quantity) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (cart_id, product_id) \
             DO UPDATE SET quantity = cart_item.quantity + EXCLUDED.quantity",
        )
        .bind(cart_id)
        .bind(product_id)
        .bind(quantity)
        .execute(self.pool)
        .await;

        match result {
            Ok(_) => self.get(cart_id).await,
            Err(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation() => {
                // No such cart to attach the item to.
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Set the quantity of an existing cart entry.
    ///
    /// Returns the refreshed cart, or `None` if the cart or the entry for
    /// `product_id` does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn update_item_quantity(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        quantity: Quantity,
    ) -> Result<Option<ShoppingCart>, RepositoryError> {
        let result = sqlx::query(
            "UPDATE cart_item SET quantity = $3 WHERE cart_id = $1 AND product_id = $2",
        )
        .bind(cart_id)
        .bind(product_id)
        .bind(quantity)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(cart_id).await
    }

    /// Remove the entry for a product from a cart.
    ///
    /// Removing a product that is not in the cart is a modification
    /// failure, reported as `None` like a missing cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn remove_item(
        &self,
        cart_id: CartId,
        product_id: ProductId,
    ) -> Result<Option<ShoppingCart>, RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_item WHERE cart_id = $1 AND product_id = $2")
            .bind(cart_id)
            .bind(product_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(cart_id).await
    }

    /// Empty a cart's item set.
    ///
    /// Clearing an already-empty cart succeeds; `None` only means the
    /// cart itself is absent.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn clear(&self, cart_id: CartId) -> Result<Option<ShoppingCart>, RepositoryError> {
        sqlx::query("DELETE FROM cart_item WHERE cart_id = $1")
            .bind(cart_id)
            .execute(self.pool)
            .await?;

        self.get(cart_id).await
    }

    /// Delete a cart and its items.
    ///
    /// # Returns
    ///
    /// Returns `true` if the cart was deleted, `false` if it didn't
    /// exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, cart_id: CartId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM shopping_cart WHERE id = $1")
            .bind(cart_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Attach item rows to a cart row, oldest entry first.
    async fn load_items(&self, row: CartRow) -> Result<ShoppingCart, RepositoryError> {
        let items = sqlx::query_as::<_, ItemRow>(
            "SELECT product_id, quantity FROM cart_item \
             WHERE cart_id = $1 ORDER BY added_at ASC, product_id ASC",
        )
        .bind(row.id)
        .fetch_all(self.pool)
        .await?;

        Ok(ShoppingCart {
            id: row.id,
            user_id: row.user_id,
            items: items
                .into_iter()
                .map(|i| CartItem {
                    product_id: i.product_id,
                    quantity: i.quantity,
                })
                .collect(),
            created_at: row.created_at,
        })
    }
}
