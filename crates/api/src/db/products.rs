//! Product repository: the catalog store.
//!
//! Everything here is plain CRUD except [`ProductRepository::decrement_stock`],
//! the one operation in the system with true compare-and-swap semantics.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use clementine_core::{Price, ProductId, Quantity};

use super::RepositoryError;
use crate::models::Product;

/// Fields required to create a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    /// Display name.
    pub name: String,
    /// Long-form description.
    pub description: String,
    /// Unit price.
    pub price: Price,
    /// Initial units on hand (>= 0).
    pub stock: i32,
    /// Category label.
    pub category: String,
}

/// Partial update applied to a product; `None` fields are left unchanged.
#[derive(Debug, Default, Clone)]
pub struct ProductChanges {
    /// New name, if changing.
    pub name: Option<String>,
    /// New description, if changing.
    pub description: Option<String>,
    /// New price, if changing.
    pub price: Option<Price>,
    /// New stock level, if changing (>= 0).
    pub stock: Option<i32>,
    /// New category, if changing.
    pub category: Option<String>,
}

/// Sortable product columns for the paginated listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    /// Sort by display name.
    #[default]
    Name,
    /// Sort by unit price.
    Price,
    /// Sort by units on hand.
    Stock,
}

impl SortBy {
    /// Parse from a query-string value.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "name" => Some(Self::Name),
            "price" => Some(Self::Price),
            "stock" => Some(Self::Stock),
            _ => None,
        }
    }

    // Column names are a closed set; interpolating them into SQL is safe.
    const fn column(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Price => "price",
            Self::Stock => "stock",
        }
    }
}

/// Sort direction for the paginated listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Ascending.
    #[default]
    Asc,
    /// Descending.
    Desc,
}

impl SortOrder {
    /// Parse from a query-string value.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    const fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Parameters for the paginated product listing.
#[derive(Debug, Clone, Default)]
pub struct ProductListQuery {
    /// Rows to skip.
    pub skip: i64,
    /// Maximum rows to return.
    pub limit: i64,
    /// Sort column.
    pub sort_by: SortBy,
    /// Sort direction.
    pub sort_order: SortOrder,
    /// Restrict to one category, if set.
    pub category: Option<String>,
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    description: String,
    price: Price,
    stock: i32,
    category: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(r: ProductRow) -> Self {
        Self {
            id: r.id,
            name: r.name,
            description: r.description,
            price: r.price,
            stock: r.stock,
            category: r.category,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

const PRODUCT_COLUMNS: &str =
    "id, name, description, price, stock, category, created_at, updated_at";

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "INSERT INTO product (id, name, description, price, stock, category) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(ProductId::generate())
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.stock)
        .bind(&product.category)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Get a product by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Apply a partial update in a single statement.
    ///
    /// Returns the updated product, or `None` if no product matched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update(
        &self,
        id: ProductId,
        changes: &ProductChanges,
    ) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "UPDATE product SET \
                 name = COALESCE($2, name), \
                 description = COALESCE($3, description), \
                 price = COALESCE($4, price), \
                 stock = COALESCE($5, stock), \
                 category = COALESCE($6, category), \
                 updated_at = now() \
             WHERE id = $1 \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .bind(changes.name.as_ref())
        .bind(changes.description.as_ref())
        .bind(changes.price)
        .bind(changes.stock)
        .bind(changes.category.as_ref())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Delete a product.
    ///
    /// # Returns
    ///
    /// Returns `true` if the product was deleted, `false` if it didn't
    /// exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM product WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List products with pagination, sorting, and an optional category
    /// filter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, query: &ProductListQuery) -> Result<Vec<Product>, RepositoryError> {
        let order = format!(
            "ORDER BY {} {}, id ASC",
            query.sort_by.column(),
            query.sort_order.keyword()
        );

        let rows = if let Some(category) = &query.category {
            sqlx::query_as::<_, ProductRow>(&format!(
                "SELECT {PRODUCT_COLUMNS} FROM product WHERE category = $1 \
                 {order} OFFSET $2 LIMIT $3"
            ))
            .bind(category)
            .bind(query.skip)
            .bind(query.limit)
            .fetch_all(self.pool)
            .await?
        } else {
            sqlx::query_as::<_, ProductRow>(&format!(
                "SELECT {PRODUCT_COLUMNS} FROM product {order} OFFSET $1 LIMIT $2"
            ))
            .bind(query.skip)
            .bind(query.limit)
            .fetch_all(self.pool)
            .await?
        };

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Atomically decrement stock if at least `quantity` units remain.
    ///
    /// One conditional update: the WHERE clause matches the product AND
    /// `stock >= quantity`, so concurrent decrements can never drive stock
    /// negative. Insufficient stock and a missing product both report
    /// `false`; the single round trip does not distinguish them.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn decrement_stock(
        &self,
        id: ProductId,
        quantity: Quantity,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE product SET stock = stock - $2, updated_at = now() \
             WHERE id = $1 AND stock >= $2",
        )
        .bind(id)
        .bind(quantity)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_by_parse() {
        assert_eq!(SortBy::parse("name"), Some(SortBy::Name));
        assert_eq!(SortBy::parse("price"), Some(SortBy::Price));
        assert_eq!(SortBy::parse("stock"), Some(SortBy::Stock));
        assert_eq!(SortBy::parse("id"), None);
        assert_eq!(SortBy::parse(""), None);
    }

    #[test]
    fn test_sort_order_parse() {
        assert_eq!(SortOrder::parse("asc"), Some(SortOrder::Asc));
        assert_eq!(SortOrder::parse("desc"), Some(SortOrder::Desc));
        assert_eq!(SortOrder::parse("ASC"), None);
    }

    #[test]
    fn test_sort_sql_fragments() {
        assert_eq!(SortBy::Price.column(), "price");
        assert_eq!(SortOrder::Desc.keyword(), "DESC");
    }
}
