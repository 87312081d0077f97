//! Product domain types.

use chrono::{DateTime, Utc};

use clementine_core::{Price, ProductId};

/// A catalog product (domain type).
///
/// Stock is a plain count rather than a [`clementine_core::Quantity`]
/// because zero is a legal stock level; only *changes* to stock must be
/// strictly positive.
#[derive(Debug, Clone)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Long-form description.
    pub description: String,
    /// Unit price, always positive.
    pub price: Price,
    /// Units on hand, never negative.
    pub stock: i32,
    /// Category label used for list filtering.
    pub category: String,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}
