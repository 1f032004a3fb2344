//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Ventas                                 │
//! │                                                                         │
//! │  Handler: Result<T, ApiError>                                          │
//! │       │                                                                 │
//! │       ├── JSON / path / query rejected ── 422 VALIDATION_ERROR         │
//! │       ├── ValidationError ─────────────── 422 VALIDATION_ERROR         │
//! │       ├── DbError::NotFound ───────────── 404 NOT_FOUND                │
//! │       ├── DbError::UniqueViolation ────── 409 CONSTRAINT_VIOLATION     │
//! │       ├── DbError::ForeignKeyViolation ── 409 CONSTRAINT_VIOLATION     │
//! │       ├── DbError::{Query,Connection..}   500 DATABASE_ERROR (logged)  │
//! │       └── DbError::Internal ───────────── 500 INTERNAL (logged)        │
//! │                                                                         │
//! │  Body: { "code": "NOT_FOUND", "message": "Customer not found: 7" }     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Internal details are logged with `tracing::error!` and replaced by a
//! generic message before reaching the client.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use ventas_core::{CoreError, ValidationError};
use ventas_db::DbError;

/// Error returned from HTTP handlers.
///
/// ## Serialization
/// ```json
/// {
///   "code": "CONSTRAINT_VIOLATION",
///   "message": "email 'ana@example.com' already exists"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (422)
    ValidationError,

    /// Unique or foreign key constraint failed (409)
    ConstraintViolation,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    /// HTTP status for this code.
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::ConstraintViolation => StatusCode::CONFLICT,
            ErrorCode::DatabaseError | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: impl std::fmt::Display) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates a constraint violation error.
    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ConstraintViolation, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, id),
            DbError::UniqueViolation { field, value } => {
                ApiError::conflict(format!("{} '{}' already exists", field, value))
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::debug!("Foreign key violation: {}", message);
                ApiError::conflict("Referenced record does not exist or is still in use")
            }
            DbError::CheckViolation { message } => {
                ApiError::validation(format!("Value rejected by the store: {}", message))
            }
            DbError::Validation(e) => e.into(),
            DbError::Domain(e) => e.into(),
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Database migration failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::PoolExhausted => {
                tracing::error!("Database pool exhausted");
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::internal("Internal server error")
            }
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(e) => e.into(),
            CoreError::AmountOverflow { .. } => ApiError::validation(err.to_string()),
        }
    }
}

// =============================================================================
// Extractor Rejections
// =============================================================================

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_error_mapping() {
        let err: ApiError = DbError::not_found("Customer", 7).into();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Customer not found: 7");
        assert_eq!(err.code.status(), StatusCode::NOT_FOUND);

        let err: ApiError = DbError::duplicate("rut", "1-9").into();
        assert_eq!(err.code.status(), StatusCode::CONFLICT);

        let err: ApiError = DbError::QueryFailed("no such table: x".to_string()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("no such table"));

        let err: ApiError = DbError::Internal("decode failed at column 3".to_string()).into();
        assert_eq!(err.code, ErrorCode::Internal);
        assert_eq!(err.code.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message.contains("column 3"));
    }

    #[test]
    fn test_validation_mapping() {
        let err: ApiError = ValidationError::MustBePositive {
            field: "cantidad".to_string(),
        }
        .into();
        assert_eq!(err.code.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.message, "cantidad must be positive");
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(ApiError::conflict("taken")).unwrap();
        assert_eq!(json, serde_json::json!({"code": "CONSTRAINT_VIOLATION", "message": "taken"}));
    }
}
