//! SeaORM entities for the storefront tables.

pub mod order;
pub mod order_item;
pub mod product;
pub mod user;
