//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)        ventas-core (CoreError)             │
//! │       │                                  │                              │
//! │       ▼                                  ▼                              │
//! │  DbError (this module) ← classifies constraint failures                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ApiError (ventas-api) ← HTTP status + JSON body                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;
use ventas_core::{CoreError, ValidationError};

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - Updating an id that doesn't exist
    /// - Listing the line items of a missing sale
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Duplicate customer email
    /// - Duplicate customer rut
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Sale referencing a non-existent customer
    /// - Line item referencing a non-existent sale or product
    /// - Deleting a product that line items still reference
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// CHECK constraint violation (negative price, zero quantity...).
    #[error("Check constraint violation: {message}")]
    CheckViolation { message: String },

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file can't be created
    /// - File permissions issue
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Input rejected before touching the store.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Domain rule failure (amount overflow).
    #[error(transparent)]
    Domain(CoreError),

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Fills in the offending value of a UniqueViolation.
    ///
    /// SQLite only reports the column, so repositories that know the
    /// submitted values pass a lookup from column name to value.
    pub fn with_duplicate_value<'a>(self, lookup: impl Fn(&str) -> Option<&'a str>) -> Self {
        match self {
            DbError::UniqueViolation { field, value } => {
                let value = lookup(&field).map(str::to_string).unwrap_or(value);
                DbError::UniqueViolation { field, value }
            }
            other => other,
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // "UNIQUE constraint failed: clientes.email"
                // "FOREIGN KEY constraint failed"
                // "CHECK constraint failed: cantidad > 0"
                if let Some(columns) = msg.strip_prefix("UNIQUE constraint failed: ") {
                    let field = columns
                        .split('.')
                        .nth(1)
                        .unwrap_or(columns)
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else if msg.contains("CHECK constraint failed") {
                    DbError::CheckViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

impl From<CoreError> for DbError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(v) => DbError::Validation(v),
            other => DbError::Domain(other),
        }
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_value_lookup() {
        let err = DbError::duplicate("email", "unknown")
            .with_duplicate_value(|field| (field == "email").then_some("ana@example.com"));
        assert_eq!(
            err.to_string(),
            "Duplicate email: 'ana@example.com' already exists"
        );
    }

    #[test]
    fn test_core_error_conversion() {
        let err: DbError = CoreError::AmountOverflow {
            context: "sale total".to_string(),
        }
        .into();
        assert!(matches!(err, DbError::Domain(_)));

        let err: DbError = CoreError::Validation(ValidationError::Required {
            field: "nombre".to_string(),
        })
        .into();
        assert!(matches!(err, DbError::Validation(_)));
    }
}
