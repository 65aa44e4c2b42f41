//! Unified error handling.
//!
//! Provides a single error type for repositories, services and the CLI.
//! Database errors are classified on conversion so that constraint
//! violations surface as their own variants.

use domain::DomainError;
use thiserror::Error;

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    // Resource errors
    #[error("Resource not found")]
    NotFound,

    #[error("{0} already exists")]
    Conflict(String),

    // Validation
    #[error("{0}")]
    Validation(String),

    /// Foreign key, RESTRICT action or CHECK constraint rejected the statement
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Unsupported database backend: {0}")]
    UnsupportedBackend(String),

    // External errors
    #[cfg(feature = "database")]
    #[error("Database error")]
    Database(sea_orm::DbErr),

    #[error("Serialization error")]
    Serialization(#[from] serde_json::Error),

    // Internal
    #[error("Internal error")]
    Internal(String),
}

impl AppError {
    /// Get error code
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::ConstraintViolation(_) => "CONSTRAINT_VIOLATION",
            AppError::UnsupportedBackend(_) => "UNSUPPORTED_BACKEND",
            #[cfg(feature = "database")]
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get a message suitable for the terminal, logging the details of
    /// opaque errors.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::ConstraintViolation(msg) => format!("Constraint violation: {}", msg),
            AppError::Conflict(msg) => {
                if msg.ends_with("already exists") {
                    msg.clone()
                } else {
                    format!("{} already exists", msg)
                }
            }

            #[cfg(feature = "database")]
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                format!("A database error occurred: {}", e)
            }
            AppError::Serialization(e) => {
                tracing::error!("Serialization error: {:?}", e);
                "Failed to serialize output".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                format!("An internal error occurred: {}", msg)
            }

            _ => self.to_string(),
        }
    }
}

// =============================================================================
// Database Error Conversion
// =============================================================================

#[cfg(feature = "database")]
impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        use sea_orm::SqlErr;

        match err.sql_err() {
            Some(SqlErr::ForeignKeyConstraintViolation(msg)) => AppError::ConstraintViolation(msg),
            Some(SqlErr::UniqueConstraintViolation(msg)) => AppError::Conflict(msg),
            _ => match constraint_failure(&err) {
                Some(msg) => AppError::ConstraintViolation(msg),
                None => AppError::Database(err),
            },
        }
    }
}

/// SQLite reports a blocked `ON DELETE RESTRICT` as a trigger constraint
#[cfg(feature = "database")]
const SQLITE_CONSTRAINT_TRIGGER: &str = "1811";
#[cfg(feature = "database")]
const SQLITE_CONSTRAINT_CHECK: &str = "275";
#[cfg(feature = "database")]
const POSTGRES_CHECK_VIOLATION: &str = "23514";

/// Constraint failures that `DbErr::sql_err` leaves unclassified.
#[cfg(feature = "database")]
fn constraint_failure(err: &sea_orm::DbErr) -> Option<String> {
    use sea_orm::sqlx::error::ErrorKind;
    use sea_orm::sqlx::Error as SqlxError;
    use sea_orm::{DbErr, RuntimeErr};

    let db_err = match err {
        DbErr::Exec(RuntimeErr::SqlxError(SqlxError::Database(e)))
        | DbErr::Query(RuntimeErr::SqlxError(SqlxError::Database(e))) => e,
        _ => return None,
    };

    let by_kind = matches!(
        db_err.kind(),
        ErrorKind::ForeignKeyViolation | ErrorKind::CheckViolation
    );
    let by_code = matches!(
        db_err.code().as_deref(),
        Some(SQLITE_CONSTRAINT_TRIGGER | SQLITE_CONSTRAINT_CHECK | POSTGRES_CHECK_VIOLATION)
    );

    (by_kind || by_code).then(|| db_err.message().to_string())
}

// =============================================================================
// Domain Error Conversion
// =============================================================================

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => AppError::Validation(msg),
        }
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Convenience constructors
impl AppError {
    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_validation_maps_to_validation() {
        let err: AppError = DomainError::validation("bad amount").into();
        assert!(matches!(err, AppError::Validation(ref m) if m == "bad amount"));
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_conflict_message_not_duplicated() {
        let err = AppError::Conflict("username already exists".to_string());
        assert_eq!(err.user_message(), "username already exists");

        let err = AppError::Conflict("username".to_string());
        assert_eq!(err.user_message(), "username already exists");
    }

    #[test]
    fn test_constraint_violation_code() {
        let err = AppError::ConstraintViolation("FOREIGN KEY constraint failed".to_string());
        assert_eq!(err.code(), "CONSTRAINT_VIOLATION");
        assert!(err.user_message().contains("FOREIGN KEY"));
    }
}
