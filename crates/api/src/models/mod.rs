//! Domain models.
//!
//! These types represent validated domain objects separate from database
//! row types and from the request/response payloads in `routes`.

pub mod cart;
pub mod product;
pub mod user;

pub use cart::{CartItem, ShoppingCart};
pub use product::Product;
pub use user::User;
