//! Repository implementations for database access
//!
//! Every repository follows the same rules:
//! - Statement text is a compile-time constant
//! - Request values reach the database only as bound parameters

pub mod products;

pub use products::{search_products, DbError, ProductRepo, ProductStore, SEARCH_PRODUCTS_SQL};
