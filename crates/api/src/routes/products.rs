//! Product route handlers.
//!
//! Reads require any active user; writes require an admin. Prices ride
//! the wire as decimal strings or JSON numbers and are parsed into
//! [`Price`] at the boundary.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use clementine_core::{Price, ProductId, Quantity};

use crate::db::products::{
    NewProduct, ProductChanges, ProductListQuery, ProductRepository, SortBy, SortOrder,
};
use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireUser};
use crate::models::Product;
use crate::routes::users::validate_pagination;
use crate::state::AppState;
use crate::validation::ValidationErrors;

const MAX_NAME_LENGTH: usize = 100;
const MAX_DESCRIPTION_LENGTH: usize = 1000;
const MAX_CATEGORY_LENGTH: usize = 50;

// =============================================================================
// Request / Response Types
// =============================================================================

/// Product creation payload.
#[derive(Debug, Deserialize)]
pub struct ProductCreateRequest {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock: i32,
    pub category: String,
}

impl ProductCreateRequest {
    fn validate(self) -> std::result::Result<NewProduct, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        check_length(&mut errors, "name", &self.name, MAX_NAME_LENGTH);
        check_length(
            &mut errors,
            "description",
            &self.description,
            MAX_DESCRIPTION_LENGTH,
        );
        check_length(&mut errors, "category", &self.category, MAX_CATEGORY_LENGTH);

        let price = errors.check("price", Price::new(self.price));
        if self.stock < 0 {
            errors.push("stock", "stock must be >= 0");
        }

        let Some(price) = price else {
            return Err(errors);
        };

        errors.finish(NewProduct {
            name: self.name,
            description: self.description,
            price,
            stock: self.stock,
            category: self.category,
        })
    }
}

/// Partial update payload; absent fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct ProductUpdateRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i32>,
    pub category: Option<String>,
}

impl ProductUpdateRequest {
    fn validate(self) -> std::result::Result<ProductChanges, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let mut changes = ProductChanges::default();

        if let Some(name) = self.name {
            check_length(&mut errors, "name", &name, MAX_NAME_LENGTH);
            changes.name = Some(name);
        }
        if let Some(description) = self.description {
            check_length(&mut errors, "description", &description, MAX_DESCRIPTION_LENGTH);
            changes.description = Some(description);
        }
        if let Some(category) = self.category {
            check_length(&mut errors, "category", &category, MAX_CATEGORY_LENGTH);
            changes.category = Some(category);
        }
        if let Some(price) = self.price {
            changes.price = errors.check("price", Price::new(price));
        }
        if let Some(stock) = self.stock {
            if stock < 0 {
                errors.push("stock", "stock must be >= 0");
            }
            changes.stock = Some(stock);
        }

        errors.finish(changes)
    }
}

fn check_length(errors: &mut ValidationErrors, field: &'static str, value: &str, max: usize) {
    if value.is_empty() {
        errors.push(field, format!("{field} cannot be empty"));
    } else if value.len() > max {
        errors.push(field, format!("{field} must be at most {max} characters"));
    }
}

/// Query parameters for the product listing.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub category: Option<String>,
}

impl ListParams {
    fn validate(self) -> std::result::Result<ProductListQuery, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let pagination = match validate_pagination(self.skip, self.limit) {
            Ok(p) => Some(p),
            Err(e) => {
                errors.errors.extend(e.errors);
                None
            }
        };

        let sort_by = match self.sort_by.as_deref() {
            None => Some(SortBy::default()),
            Some(s) => {
                let parsed = SortBy::parse(s);
                if parsed.is_none() {
                    errors.push("sort_by", "sort_by must be one of: name, price, stock");
                }
                parsed
            }
        };

        let sort_order = match self.sort_order.as_deref() {
            None => Some(SortOrder::default()),
            Some(s) => {
                let parsed = SortOrder::parse(s);
                if parsed.is_none() {
                    errors.push("sort_order", "sort_order must be one of: asc, desc");
                }
                parsed
            }
        };

        match (pagination, sort_by, sort_order) {
            (Some((skip, limit)), Some(sort_by), Some(sort_order)) => {
                errors.finish(ProductListQuery {
                    skip,
                    limit,
                    sort_by,
                    sort_order,
                    category: self.category,
                })
            }
            _ => Err(errors),
        }
    }
}

/// Query parameters for the stock decrement.
#[derive(Debug, Deserialize)]
pub struct StockParams {
    pub quantity: i32,
}

/// Public view of a product.
#[derive(Debug, Serialize)]
pub struct ProductOut {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub stock: i32,
    pub category: String,
}

impl From<Product> for ProductOut {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.price,
            stock: product.stock,
            category: product.category,
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// `POST /products` - create a product; admin only.
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(payload): Json<ProductCreateRequest>,
) -> Result<(StatusCode, Json<ProductOut>)> {
    let new_product = payload.validate()?;

    let products = ProductRepository::new(state.pool());
    let product = products.create(&new_product).await?;

    Ok((StatusCode::CREATED, Json(product.into())))
}

/// `GET /products/{id}` - fetch a product; any active user.
pub async fn show(
    State(state): State<AppState>,
    RequireUser(_principal): RequireUser,
    Path(product_id): Path<ProductId>,
) -> Result<Json<ProductOut>> {
    let products = ProductRepository::new(state.pool());
    let product = products
        .get(product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))?;

    Ok(Json(product.into()))
}

/// `GET /products` - paginated, sorted, optionally filtered listing.
pub async fn index(
    State(state): State<AppState>,
    RequireUser(_principal): RequireUser,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<ProductOut>>> {
    let query = params.validate()?;

    let products = ProductRepository::new(state.pool());
    let page = products.list(&query).await?;

    Ok(Json(page.into_iter().map(Into::into).collect()))
}

/// `PUT /products/{id}` - partial update; admin only.
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(product_id): Path<ProductId>,
    Json(payload): Json<ProductUpdateRequest>,
) -> Result<Json<ProductOut>> {
    let changes = payload.validate()?;

    let products = ProductRepository::new(state.pool());
    let product = products
        .update(product_id, &changes)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))?;

    Ok(Json(product.into()))
}

/// `DELETE /products/{id}` - delete a product; admin only. Replies 204.
pub async fn remove(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(product_id): Path<ProductId>,
) -> Result<StatusCode> {
    let products = ProductRepository::new(state.pool());
    let deleted = products.delete(product_id).await?;

    if !deleted {
        return Err(AppError::NotFound("Product not found".to_owned()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// `PATCH /products/{id}/stock?quantity=n` - atomic stock decrement;
/// admin only.
///
/// The repository's conditional update either applies fully or reports no
/// change; no change is a 400, whether the product is missing or its
/// stock is short.
pub async fn decrement_stock(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(product_id): Path<ProductId>,
    Query(params): Query<StockParams>,
) -> Result<Json<Value>> {
    let mut errors = ValidationErrors::new();
    let quantity = errors.check("quantity", Quantity::new(params.quantity));
    let quantity = match quantity {
        Some(q) => q,
        None => return Err(errors.into()),
    };

    let products = ProductRepository::new(state.pool());
    let updated = products.decrement_stock(product_id, quantity).await?;

    if !updated {
        return Err(AppError::PreconditionFailed(
            "Failed to update stock. Check if the product exists and has sufficient stock."
                .to_owned(),
        ));
    }

    Ok(Json(json!({ "message": "Stock updated successfully" })))
}
