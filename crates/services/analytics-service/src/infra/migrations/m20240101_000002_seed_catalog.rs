//! Migration: Seed the sample catalog.
//!
//! 5 users, 10 products, 8 orders and 16 order items. Ids are assigned by the
//! database in insertion order, so the item rows below reference orders and
//! products by that order. Order amounts are entered as recorded at checkout
//! and deliberately do not always match the sum of their line items.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(SEED_USERS_SQL).await?;
        db.execute_unprepared(SEED_PRODUCTS_SQL).await?;
        db.execute_unprepared(SEED_ORDERS_SQL).await?;
        db.execute_unprepared(SEED_ORDER_ITEMS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared("DELETE FROM order_items").await?;
        db.execute_unprepared("DELETE FROM orders").await?;
        db.execute_unprepared("DELETE FROM products").await?;
        db.execute_unprepared("DELETE FROM users").await?;

        Ok(())
    }
}

const SEED_USERS_SQL: &str = r"
INSERT INTO users (username, email, registered_at) VALUES
    ('alice', 'alice@example.com', '2023-06-01 09:00:00'),
    ('bob',   'bob@example.com',   '2023-07-15 12:30:00'),
    ('carol', 'carol@example.com', '2023-08-20 18:45:00'),
    ('dave',  'dave@example.com',  '2023-09-05 08:10:00'),
    ('eve',   'eve@example.com',   '2023-10-12 21:05:00')
";

const SEED_PRODUCTS_SQL: &str = r"
INSERT INTO products (name, price, description) VALUES
    ('Laptop Pro 14',               1299.00, 'Lightweight laptop with a 14-inch display and all-day battery'),
    ('Wireless Mouse',                25.99, 'Ergonomic wireless mouse with silent clicks'),
    ('Mechanical Keyboard',           89.50, 'Backlit mechanical keyboard with tactile switches'),
    ('USB-C Hub',                     45.00, 'Seven-port USB-C hub with HDMI output and card reader'),
    ('Noise Cancelling Headphones',  199.99, 'Over-ear wireless headphones with active noise cancelling'),
    ('4K Monitor',                   349.00, '27-inch 4K monitor with wide color gamut'),
    ('HD Webcam',                     59.90, 'Full HD webcam with built-in microphone'),
    ('Portable SSD 1TB',             119.00, 'Compact portable SSD with fast transfer speeds'),
    ('Desk Lamp',                     34.75, 'LED desk lamp with adjustable brightness'),
    ('Laptop Stand',                  39.00, 'Aluminium laptop stand for better posture')
";

const SEED_ORDERS_SQL: &str = r"
INSERT INTO orders (user_id, order_date, status, amount) VALUES
    (1, '2024-01-05 10:00:00', 'completed',  1324.99),
    (2, '2024-01-07 14:30:00', 'completed',    89.50),
    (3, '2024-01-10 09:15:00', 'shipped',     548.99),
    (1, '2024-01-12 16:45:00', 'completed',    45.00),
    (4, '2024-01-15 11:20:00', 'pending',     119.00),
    (5, '2024-01-18 13:00:00', 'completed',   384.75),
    (2, '2024-01-22 08:40:00', 'processing',   59.90),
    (3, '2024-01-25 19:10:00', 'completed',  1299.00)
";

const SEED_ORDER_ITEMS_SQL: &str = r"
INSERT INTO order_items (order_id, product_id, quantity, unit_price) VALUES
    (1, 1,  1, 1299.00),
    (1, 2,  1,   25.99),
    (2, 3,  1,   89.50),
    (2, 2,  1,   25.99),
    (3, 5,  1,  199.99),
    (3, 6,  1,  349.00),
    (4, 4,  1,   45.00),
    (4, 10, 1,   39.00),
    (5, 8,  1,  119.00),
    (5, 9,  1,   34.75),
    (6, 6,  1,  349.00),
    (6, 9,  1,   34.75),
    (7, 7,  1,   59.90),
    (7, 2,  2,   25.99),
    (8, 1,  1, 1299.00),
    (8, 10, 1,   39.00)
";
