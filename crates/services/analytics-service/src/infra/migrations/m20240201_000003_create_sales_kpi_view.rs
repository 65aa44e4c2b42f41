//! Migration: Create the daily sales KPI view.
//!
//! A plain view, so every read recomputes from `orders`.

use sea_orm_migration::prelude::*;

use domain::STATUS_COMPLETED;

use super::SALES_KPI_VIEW;
use crate::infra::Dialect;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        let dialect = Dialect::new(manager.get_database_backend());
        let day = dialect.day("order_date");

        // A view left behind by a table-only reset must not block re-creation
        db.execute_unprepared(&format!("DROP VIEW IF EXISTS {}", SALES_KPI_VIEW))
            .await?;
        db.execute_unprepared(&format!(
            "CREATE VIEW {view} AS \
             SELECT {day} AS sales_date, \
                    COUNT(*) AS order_count, \
                    SUM(amount) AS total_revenue, \
                    AVG(amount) AS avg_order_value \
             FROM orders \
             WHERE status = '{status}' \
             GROUP BY {day}",
            view = SALES_KPI_VIEW,
            day = day,
            status = STATUS_COMPLETED,
        ))
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(&format!("DROP VIEW IF EXISTS {}", SALES_KPI_VIEW))
            .await?;
        Ok(())
    }
}
