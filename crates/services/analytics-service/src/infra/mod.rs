//! Infrastructure layer - database connection, dialect and schema management.

mod db;
mod dialect;
pub mod evolution;
pub mod migrations;

pub use db::Database;
pub use dialect::Dialect;
pub use evolution::SchemaChange;
pub use migrations::Migrator;
