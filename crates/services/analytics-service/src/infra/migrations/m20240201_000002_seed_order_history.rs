//! Migration: Load two months of order history (January and February 2025).
//!
//! One order per day so daily revenue equals the completed order of that day.
//! History orders carry no line items.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(SEED_ORDER_HISTORY_SQL)
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                "DELETE FROM orders \
                 WHERE order_date >= '2025-01-01 00:00:00' AND order_date < '2025-03-01 00:00:00'",
            )
            .await?;
        Ok(())
    }
}

const SEED_ORDER_HISTORY_SQL: &str = r"
INSERT INTO orders (user_id, order_date, status, amount) VALUES
    (1, '2025-01-02 09:30:00', 'completed',   250.00),
    (2, '2025-01-03 11:00:00', 'completed',   120.50),
    (3, '2025-01-04 15:20:00', 'completed',   980.00),
    (4, '2025-01-05 10:10:00', 'completed',    75.25),
    (5, '2025-01-06 17:45:00', 'completed',   430.00),
    (1, '2025-01-08 12:00:00', 'shipped',     199.99),
    (2, '2025-01-10 13:30:00', 'completed',    60.00),
    (3, '2025-01-12 09:05:00', 'completed',    45.00),
    (4, '2025-01-15 16:40:00', 'completed',   310.75),
    (5, '2025-01-18 08:55:00', 'pending',      89.50),
    (1, '2025-01-21 19:25:00', 'completed',  1299.00),
    (2, '2025-01-25 10:35:00', 'completed',    35.00),
    (3, '2025-01-29 14:15:00', 'processing',  150.00),
    (4, '2025-02-01 09:00:00', 'completed',   220.00),
    (5, '2025-02-02 11:30:00', 'completed',   510.40),
    (1, '2025-02-04 14:50:00', 'completed',    89.50),
    (2, '2025-02-06 10:20:00', 'completed',   640.00),
    (3, '2025-02-09 18:05:00', 'completed',   119.00),
    (4, '2025-02-11 12:40:00', 'shipped',      59.90),
    (5, '2025-02-14 15:15:00', 'completed',   275.00),
    (1, '2025-02-17 09:45:00', 'completed',    45.00),
    (2, '2025-02-19 13:10:00', 'pending',     199.99),
    (3, '2025-02-22 16:30:00', 'completed',   349.00),
    (4, '2025-02-25 11:55:00', 'completed',    34.75),
    (5, '2025-02-27 17:20:00', 'completed',   120.00)
";
