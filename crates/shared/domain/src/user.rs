//! User domain entity.

use chrono::NaiveDateTime;
use serde::Serialize;

/// Storefront customer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub registered_at: NaiveDateTime,
    /// Populated by schema evolution; `None` before the column exists or is backfilled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}
