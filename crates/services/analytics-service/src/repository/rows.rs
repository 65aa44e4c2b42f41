//! Helpers for raw statements and decoding their rows.

use chrono::NaiveDate;
use sea_orm::{QueryResult, Statement, TryGetable, Value};

use common::{AppError, AppResult};
use domain::DAY_FORMAT;

use crate::infra::Dialect;

pub(crate) fn statement(
    dialect: &Dialect,
    sql: impl Into<String>,
    values: Vec<Value>,
) -> Statement {
    Statement::from_sql_and_values(dialect.backend(), sql, values)
}

/// Read a column, attaching its name to decode failures
pub(crate) fn get<T: TryGetable>(row: &QueryResult, column: &str) -> AppResult<T> {
    row.try_get::<T>("", column)
        .map_err(|e| AppError::internal(format!("column '{}': {}", column, e)))
}

/// Read a `YYYY-MM-DD` day column
pub(crate) fn get_day(row: &QueryResult, column: &str) -> AppResult<NaiveDate> {
    let raw: String = get(row, column)?;
    NaiveDate::parse_from_str(&raw, DAY_FORMAT)
        .map_err(|e| AppError::internal(format!("column '{}' is not a day ({}): {}", column, raw, e)))
}

pub(crate) fn non_negative(count: i64) -> u64 {
    u64::try_from(count).unwrap_or_default()
}
