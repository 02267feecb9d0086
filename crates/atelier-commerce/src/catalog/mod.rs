//! Read-only view of the external product catalog.
//!
//! The engine never mutates catalog data; it only needs enough of a product
//! to price and display a cart line.

mod product;
mod text;

pub use product::{Catalog, ProductRef};
pub use text::{LocalizedText, DEFAULT_LOCALE};
