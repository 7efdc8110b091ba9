//! # Row-store Errors
//!
//! ```text
//! sqlx::Error ──► DbError ──► StoreError (estoque-core) ──► InventoryError
//!                  │              keeps SQLite's extended     AuthError
//!                  │              result code, e.g. "2067"
//!                  └── constraint kind read from the SQLite message
//! ```
//!
//! | SQLite message                     | DbError             | StoreErrorCode      |
//! |------------------------------------|---------------------|---------------------|
//! | `UNIQUE constraint failed: t.col`  | UniqueViolation     | UniqueViolation     |
//! | `FOREIGN KEY constraint failed`    | ForeignKeyViolation | ForeignKeyViolation |
//! | `CHECK constraint failed: expr`    | CheckViolation      | CheckViolation      |
//! | pool timed out / closed            | PoolExhausted, ...  | Unavailable         |

use estoque_core::{StoreError, StoreErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    /// No row with that id, including UPDATE/DELETE that touched zero rows.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation (e.g. an email already registered).
    #[error("Duplicate {field}")]
    UniqueViolation { field: String, code: Option<String> },

    /// Only `profiles.id → users.id` carries a foreign key.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation {
        message: String,
        code: Option<String>,
    },

    /// Negative quantity or price, blank name, zero movement delta, or an
    /// unknown status/role/movement label.
    #[error("Check violation: {message}")]
    CheckViolation {
        message: String,
        code: Option<String>,
    },

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Any other error SQLite reported for a statement.
    #[error("Query failed: {message}")]
    QueryFailed {
        message: String,
        code: Option<String>,
    },

    /// No connection freed up within `DbConfig::connect_timeout`.
    #[error("Connection pool exhausted")]
    PoolExhausted,

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound { .. })
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Row", "unknown"),

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();
                let code = db_err.code().map(|c| c.into_owned());

                if let Some(field) = msg.strip_prefix("UNIQUE constraint failed: ") {
                    DbError::UniqueViolation {
                        field: field.to_string(),
                        code,
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                        code,
                    }
                } else if msg.contains("CHECK constraint failed") {
                    DbError::CheckViolation {
                        message: msg.to_string(),
                        code,
                    }
                } else {
                    DbError::QueryFailed {
                        message: msg.to_string(),
                        code,
                    }
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

/// Collapse into the backend-neutral error the store contracts return.
impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        let message = err.to_string();
        let (code, native) = match err {
            DbError::NotFound { .. } => (StoreErrorCode::NotFound, None),
            DbError::UniqueViolation { code, .. } => (StoreErrorCode::UniqueViolation, code),
            DbError::ForeignKeyViolation { code, .. } => (StoreErrorCode::ForeignKeyViolation, code),
            DbError::CheckViolation { code, .. } => (StoreErrorCode::CheckViolation, code),
            DbError::QueryFailed { code, .. } => (StoreErrorCode::Internal, code),
            DbError::ConnectionFailed(_) | DbError::PoolExhausted => {
                (StoreErrorCode::Unavailable, None)
            }
            DbError::MigrationFailed(_) | DbError::Internal(_) => (StoreErrorCode::Internal, None),
        };

        let store = StoreError::new(code, message);
        match native {
            Some(native) => store.with_native_code(native),
            None => store,
        }
    }
}

pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_store_not_found() {
        let store: StoreError = DbError::not_found("Product", "p-1").into();
        assert!(store.is_not_found());
        assert_eq!(store.message, "Product not found: p-1");
    }

    #[test]
    fn test_check_violation_keeps_native_code() {
        let err = DbError::CheckViolation {
            message: "CHECK constraint failed: quantity >= 0".to_string(),
            code: Some("275".to_string()),
        };
        let store: StoreError = err.into();
        assert_eq!(store.code, StoreErrorCode::CheckViolation);
        assert_eq!(store.native_code.as_deref(), Some("275"));
    }

    #[test]
    fn test_pool_failures_are_unavailable() {
        let store: StoreError = DbError::PoolExhausted.into();
        assert_eq!(store.code, StoreErrorCode::Unavailable);
    }
}
