//! Database migrations.
//!
//! Each migration is a separate module following SeaORM conventions.
//! Migration names follow the pattern: m{YYYYMMDD}_{NNNNNN}_{description}
//!
//! The 2024-01 migrations initialise the catalog; the 2024-02 migrations
//! prepare it for reporting.

use sea_orm_migration::prelude::*;

mod m20240101_000001_create_commerce_tables;
mod m20240101_000002_seed_catalog;
mod m20240201_000001_evolve_user_city_and_order_index;
mod m20240201_000002_seed_order_history;
mod m20240201_000003_create_sales_kpi_view;

pub const IDX_PRODUCTS_NAME: &str = "idx_products_name";
pub const IDX_PRODUCTS_DESCRIPTION_FTS: &str = "idx_products_description_fts";
pub const IDX_ORDERS_USER_ID: &str = "idx_orders_user_id";
/// Single-column order date index created by the catalog, replaced by evolution
pub const IDX_ORDERS_DATE: &str = "idx_orders_date";
pub const IDX_ORDERS_DATE_STATUS: &str = "idx_orders_date_status";
pub const IDX_ORDER_ITEMS_ORDER_ID: &str = "idx_order_items_order_id";
pub const IDX_ORDER_ITEMS_PRODUCT_ID: &str = "idx_order_items_product_id";

pub const SALES_KPI_VIEW: &str = "v_sales_kpi_summary";

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_commerce_tables::Migration),
            Box::new(m20240101_000002_seed_catalog::Migration),
            Box::new(m20240201_000001_evolve_user_city_and_order_index::Migration),
            Box::new(m20240201_000002_seed_order_history::Migration),
            Box::new(m20240201_000003_create_sales_kpi_view::Migration),
        ]
    }
}
