//! Seed the catalog with products.
//!
//! Reads a JSON array of products from a file, or falls back to a small
//! built-in demo catalog. Inserts go through the same repository and
//! validation as the API, so seeded rows obey the catalog invariants.

use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;

use clementine_api::db;
use clementine_api::db::products::{NewProduct, ProductRepository};
use clementine_core::Price;

use super::{CommandError, database_url};

/// One product entry in a seed file.
#[derive(Debug, Deserialize)]
struct SeedProduct {
    name: String,
    description: String,
    price: Decimal,
    stock: i32,
    category: String,
}

/// Seed products from `file`, or the built-in demo set when absent.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, a price is not
/// positive, or an insert fails.
pub async fn products(file: Option<&Path>) -> Result<(), CommandError> {
    let entries: Vec<SeedProduct> = match file {
        Some(path) => {
            let content = tokio::fs::read_to_string(path)
                .await
                .map_err(|e| CommandError::InvalidInput(format!("{}: {e}", path.display())))?;
            serde_json::from_str(&content)
                .map_err(|e| CommandError::InvalidInput(format!("{}: {e}", path.display())))?
        }
        None => demo_catalog(),
    };

    let url = database_url()?;
    let pool = db::create_pool(&url)
        .await
        .map_err(CommandError::Database)?;
    let repo = ProductRepository::new(&pool);

    let mut inserted = 0usize;
    for entry in entries {
        let price = Price::new(entry.price)
            .map_err(|e| CommandError::InvalidInput(format!("{}: {e}", entry.name)))?;
        if entry.stock < 0 {
            return Err(CommandError::InvalidInput(format!(
                "{}: stock must be >= 0",
                entry.name
            )));
        }

        let product = repo
            .create(&NewProduct {
                name: entry.name,
                description: entry.description,
                price,
                stock: entry.stock,
                category: entry.category,
            })
            .await
            .map_err(|e| CommandError::InvalidInput(e.to_string()))?;

        tracing::info!(id = %product.id, name = %product.name, "Seeded product");
        inserted += 1;
    }

    tracing::info!(inserted, "Catalog seeding complete");
    Ok(())
}

/// Built-in demo catalog used when no seed file is given.
fn demo_catalog() -> Vec<SeedProduct> {
    vec![
        SeedProduct {
            name: "Espresso Beans".to_owned(),
            description: "Dark roast arabica, 1kg bag".to_owned(),
            price: Decimal::new(1499, 2),
            stock: 40,
            category: "coffee".to_owned(),
        },
        SeedProduct {
            name: "Pour-Over Kettle".to_owned(),
            description: "Gooseneck kettle, 1L, matte black".to_owned(),
            price: Decimal::new(4250, 2),
            stock: 12,
            category: "equipment".to_owned(),
        },
        SeedProduct {
            name: "Ceramic Mug".to_owned(),
            description: "350ml stoneware mug".to_owned(),
            price: Decimal::new(1800, 2),
            stock: 60,
            category: "equipment".to_owned(),
        },
    ]
}
