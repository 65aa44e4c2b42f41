//! Commerce repository: lookups, order recording, deletes governed by the
//! referential actions of the schema, and the post-seed diagnostics.

use async_trait::async_trait;
use sea_orm::{
    ActiveValue::{NotSet, Set},
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
};

use common::{AppError, AppResult};
use domain::{LineTotalMismatch, NewOrder, ProductMatch, TableCounts, User};

use super::entities::{order, order_item, product, user};
use super::rows::{get, non_negative, statement};
use crate::infra::Dialect;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Commerce repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CommerceRepository: Send + Sync {
    /// Find user by unique username
    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Insert an order and return its id
    async fn record_order(&self, order: NewOrder) -> AppResult<i32>;

    /// Delete a user; blocked while the user has orders
    async fn delete_user(&self, id: i32) -> AppResult<()>;

    /// Delete an order together with its items
    async fn delete_order(&self, id: i32) -> AppResult<()>;

    /// Delete a product; blocked while order items reference it
    async fn delete_product(&self, id: i32) -> AppResult<()>;

    /// Number of items belonging to an order
    async fn count_order_items(&self, order_id: i32) -> AppResult<u64>;

    /// Row count of every base table
    async fn table_counts(&self) -> AppResult<TableCounts>;

    /// Orders whose user cannot be joined
    async fn orphaned_orders(&self) -> AppResult<u64>;

    /// Products whose description matches a search term
    async fn search_products(&self, term: &str) -> AppResult<Vec<ProductMatch>>;

    /// Orders whose item line totals differ from the recorded amount
    async fn line_total_mismatches(&self) -> AppResult<Vec<LineTotalMismatch>>;
}

/// Concrete implementation of CommerceRepository
pub struct CommerceStore {
    db: DatabaseConnection,
    dialect: Dialect,
}

impl CommerceStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        let dialect = Dialect::new(db.get_database_backend());
        Self { db, dialect }
    }
}

#[async_trait]
impl CommerceRepository for CommerceStore {
    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let result = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?;

        Ok(result.map(User::from))
    }

    async fn record_order(&self, order: NewOrder) -> AppResult<i32> {
        order.validate()?;

        let active_model = order::ActiveModel {
            id: NotSet,
            user_id: Set(order.user_id),
            order_date: Set(order.order_date),
            status: Set(order.status.as_str().to_string()),
            amount: Set(order.amount),
        };

        let result = order::Entity::insert(active_model).exec(&self.db).await?;
        let id = result.last_insert_id;

        tracing::debug!("Recorded {} order {} for user {}", order.status, id, order.user_id);
        Ok(id)
    }

    async fn delete_user(&self, id: i32) -> AppResult<()> {
        let result = user::Entity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    async fn delete_order(&self, id: i32) -> AppResult<()> {
        let result = order::Entity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    async fn delete_product(&self, id: i32) -> AppResult<()> {
        let result = product::Entity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    async fn count_order_items(&self, order_id: i32) -> AppResult<u64> {
        let count = order_item::Entity::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .count(&self.db)
            .await?;

        Ok(count)
    }

    async fn table_counts(&self) -> AppResult<TableCounts> {
        Ok(TableCounts {
            users: user::Entity::find().count(&self.db).await?,
            products: product::Entity::find().count(&self.db).await?,
            orders: order::Entity::find().count(&self.db).await?,
            order_items: order_item::Entity::find().count(&self.db).await?,
        })
    }

    async fn orphaned_orders(&self) -> AppResult<u64> {
        let d = &self.dialect;
        let sql = format!(
            "SELECT {} AS orphans \
             FROM orders o LEFT JOIN users u ON u.id = o.user_id \
             WHERE u.id IS NULL",
            d.integer("COUNT(*)")
        );

        let row = self
            .db
            .query_one(statement(d, sql, vec![]))
            .await?
            .ok_or_else(|| AppError::internal("count returned no row"))?;

        Ok(non_negative(get(&row, "orphans")?))
    }

    async fn search_products(&self, term: &str) -> AppResult<Vec<ProductMatch>> {
        let d = &self.dialect;
        let sql = format!(
            "SELECT p.id AS id, p.name AS name FROM products p WHERE {} ORDER BY p.id",
            d.text_search("p.description", 1)
        );

        let rows = self
            .db
            .query_all(statement(d, sql, vec![d.search_value(term).into()]))
            .await?;

        rows.iter()
            .map(|row| {
                Ok(ProductMatch {
                    id: get(row, "id")?,
                    name: get(row, "name")?,
                })
            })
            .collect()
    }

    async fn line_total_mismatches(&self) -> AppResult<Vec<LineTotalMismatch>> {
        let d = &self.dialect;
        let sql = format!(
            "SELECT o.id AS order_id, {amount} AS amount, {line_total} AS line_total \
             FROM orders o JOIN order_items oi ON oi.order_id = o.id \
             GROUP BY o.id, o.amount \
             HAVING ABS(o.amount - SUM(oi.quantity * oi.unit_price)) > 0.005 \
             ORDER BY o.id",
            amount = d.money("o.amount"),
            line_total = d.money("SUM(oi.quantity * oi.unit_price)"),
        );

        let rows = self.db.query_all(statement(d, sql, vec![])).await?;

        rows.iter()
            .map(|row| {
                Ok(LineTotalMismatch {
                    order_id: get(row, "order_id")?,
                    amount: get(row, "amount")?,
                    line_total: get(row, "line_total")?,
                })
            })
            .collect()
    }
}
