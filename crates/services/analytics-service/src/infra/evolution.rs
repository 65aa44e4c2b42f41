//! Idempotent schema evolution.
//!
//! The evolution step brings the seeded schema to its reporting shape:
//! `users.city` exists, the single-column `idx_orders_date` is replaced by
//! the composite `idx_orders_date_status`. The actual state is read through
//! the migrator's catalog probes, diffed against the desired state, and only
//! the missing changes are applied. Running it again plans nothing.
//!
//! Probe and DDL are separate statements. Nothing else may alter the schema
//! while this runs.

use sea_orm_migration::prelude::*;

use domain::DEFAULT_CITY;

use super::migrations::{IDX_ORDERS_DATE, IDX_ORDERS_DATE_STATUS};

const USERS_TABLE: &str = "users";
const ORDERS_TABLE: &str = "orders";
const CITY_COLUMN: &str = "city";

/// Cities of the seeded customers, by username
pub const SEED_CITIES: &[(&str, &str)] = &[
    ("alice", "New York"),
    ("bob", "New York"),
    ("carol", "Los Angeles"),
    ("dave", "Los Angeles"),
    ("eve", "Chicago"),
];

/// Introspected state of the objects evolution manages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SchemaSnapshot {
    pub user_city: bool,
    pub legacy_order_date_index: bool,
    pub order_date_status_index: bool,
}

impl SchemaSnapshot {
    /// The reporting shape
    pub fn desired() -> Self {
        Self {
            user_city: true,
            legacy_order_date_index: false,
            order_date_status_index: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaChange {
    AddUserCity,
    DropLegacyOrderDateIndex,
    CreateOrderDateStatusIndex,
}

impl std::fmt::Display for SchemaChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaChange::AddUserCity => write!(f, "add column users.{}", CITY_COLUMN),
            SchemaChange::DropLegacyOrderDateIndex => write!(f, "drop index {}", IDX_ORDERS_DATE),
            SchemaChange::CreateOrderDateStatusIndex => {
                write!(f, "create index {}", IDX_ORDERS_DATE_STATUS)
            }
        }
    }
}

/// Changes needed to move `actual` to [`SchemaSnapshot::desired`].
pub fn plan(actual: &SchemaSnapshot) -> Vec<SchemaChange> {
    let desired = SchemaSnapshot::desired();
    let mut changes = Vec::new();

    if actual.user_city != desired.user_city {
        changes.push(SchemaChange::AddUserCity);
    }
    if actual.legacy_order_date_index != desired.legacy_order_date_index {
        changes.push(SchemaChange::DropLegacyOrderDateIndex);
    }
    if actual.order_date_status_index != desired.order_date_status_index {
        changes.push(SchemaChange::CreateOrderDateStatusIndex);
    }

    changes
}

pub async fn inspect(manager: &SchemaManager<'_>) -> Result<SchemaSnapshot, DbErr> {
    Ok(SchemaSnapshot {
        user_city: manager.has_column(USERS_TABLE, CITY_COLUMN).await?,
        legacy_order_date_index: manager.has_index(ORDERS_TABLE, IDX_ORDERS_DATE).await?,
        order_date_status_index: manager
            .has_index(ORDERS_TABLE, IDX_ORDERS_DATE_STATUS)
            .await?,
    })
}

pub async fn apply(manager: &SchemaManager<'_>, change: SchemaChange) -> Result<(), DbErr> {
    match change {
        SchemaChange::AddUserCity => {
            manager
                .alter_table(
                    Table::alter()
                        .table(Users::Table)
                        .add_column(
                            ColumnDef::new(Users::City)
                                .string_len(50)
                                .null()
                                .default(DEFAULT_CITY),
                        )
                        .to_owned(),
                )
                .await
        }
        SchemaChange::DropLegacyOrderDateIndex => {
            manager
                .drop_index(
                    Index::drop()
                        .name(IDX_ORDERS_DATE)
                        .table(Orders::Table)
                        .to_owned(),
                )
                .await
        }
        SchemaChange::CreateOrderDateStatusIndex => {
            manager
                .create_index(
                    Index::create()
                        .name(IDX_ORDERS_DATE_STATUS)
                        .table(Orders::Table)
                        .col(Orders::OrderDate)
                        .col(Orders::Status)
                        .to_owned(),
                )
                .await
        }
    }
}

/// Assign seed cities to users still without one. Returns rows updated.
pub async fn backfill_cities(manager: &SchemaManager<'_>) -> Result<u64, DbErr> {
    let cases: String = SEED_CITIES
        .iter()
        .map(|(username, city)| format!(" WHEN '{}' THEN '{}'", username, city))
        .collect();
    let usernames = SEED_CITIES
        .iter()
        .map(|(username, _)| format!("'{}'", username))
        .collect::<Vec<_>>()
        .join(", ");

    let sql = format!(
        "UPDATE users SET city = CASE username{} ELSE city END \
         WHERE (city IS NULL OR city = '{}') AND username IN ({})",
        cases, DEFAULT_CITY, usernames
    );

    let result = manager.get_connection().execute_unprepared(&sql).await?;
    Ok(result.rows_affected())
}

/// Inspect, plan, apply the delta and backfill. Returns the applied changes.
pub async fn evolve(manager: &SchemaManager<'_>) -> Result<Vec<SchemaChange>, DbErr> {
    let actual = inspect(manager).await?;
    let changes = plan(&actual);

    if changes.is_empty() {
        tracing::info!("Schema already in reporting shape");
    }
    for change in &changes {
        tracing::info!("Applying schema change: {}", change);
        apply(manager, *change).await?;
    }

    let backfilled = backfill_cities(manager).await?;
    tracing::debug!("Backfilled city for {} user(s)", backfilled);

    Ok(changes)
}

/// Return to the seeded shape.
pub async fn revert(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    let actual = inspect(manager).await?;

    if actual.order_date_status_index {
        manager
            .drop_index(
                Index::drop()
                    .name(IDX_ORDERS_DATE_STATUS)
                    .table(Orders::Table)
                    .to_owned(),
            )
            .await?;
    }
    if !actual.legacy_order_date_index {
        manager
            .create_index(
                Index::create()
                    .name(IDX_ORDERS_DATE)
                    .table(Orders::Table)
                    .col(Orders::OrderDate)
                    .to_owned(),
            )
            .await?;
    }
    if actual.user_city {
        manager
            .alter_table(
                Table::alter()
                    .table(Users::Table)
                    .drop_column(Users::City)
                    .to_owned(),
            )
            .await?;
    }

    Ok(())
}

#[derive(DeriveIden)]
enum Users {
    Table,
    City,
}

#[derive(DeriveIden)]
enum Orders {
    Table,
    OrderDate,
    Status,
}
