//! # Error Types
//!
//! Domain-level error types shared by every Estoque crate.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  estoque-core (this file)                                              │
//! │  ├── ValidationError  - Input rejected before any store call           │
//! │  └── StoreError       - Backend-neutral row-store failure              │
//! │                                                                         │
//! │  estoque-db                                                            │
//! │  └── DbError          - sqlx failures, converted into StoreError       │
//! │                                                                         │
//! │  estoque-inventory                                                     │
//! │  ├── InventoryError   - Validation | NotFound | Store                  │
//! │  └── AuthError        - Session provider failures                      │
//! │                                                                         │
//! │  Flow: DbError → StoreError → InventoryError → Presentation            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised by the caller-side checks that run before a store request is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be greater than zero.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must be zero or greater.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., invalid UUID, malformed email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Store Error
// =============================================================================

/// Category of a row-store failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreErrorCode {
    /// The addressed row does not exist.
    NotFound,
    /// A UNIQUE constraint rejected the write.
    UniqueViolation,
    /// A FOREIGN KEY constraint rejected the write.
    ForeignKeyViolation,
    /// A CHECK constraint rejected the write (e.g. negative quantity).
    CheckViolation,
    /// The store's access policy refused the request.
    PermissionDenied,
    /// The store could not be reached (pool closed, timeout).
    Unavailable,
    /// Anything else.
    Internal,
}

impl std::fmt::Display for StoreErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StoreErrorCode::NotFound => "not_found",
            StoreErrorCode::UniqueViolation => "unique_violation",
            StoreErrorCode::ForeignKeyViolation => "foreign_key_violation",
            StoreErrorCode::CheckViolation => "check_violation",
            StoreErrorCode::PermissionDenied => "permission_denied",
            StoreErrorCode::Unavailable => "unavailable",
            StoreErrorCode::Internal => "internal",
        };
        f.write_str(s)
    }
}

/// A failure reported by the Product Store, Movement Ledger or Profile Store.
///
/// Keeps the backend's own error code (`native_code`) next to the
/// categorised one so nothing is lost on the way to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("store error ({code}): {message}")]
pub struct StoreError {
    pub code: StoreErrorCode,
    pub message: String,
    pub native_code: Option<String>,
}

impl StoreError {
    pub fn new(code: StoreErrorCode, message: impl Into<String>) -> Self {
        StoreError {
            code,
            message: message.into(),
            native_code: None,
        }
    }

    /// Attaches the backend-native code (SQLite extended code, HTTP status...).
    pub fn with_native_code(mut self, native_code: impl Into<String>) -> Self {
        self.native_code = Some(native_code.into());
        self
    }

    pub fn not_found(entity: &str, id: &str) -> Self {
        StoreError::new(StoreErrorCode::NotFound, format!("{entity} not found: {id}"))
    }

    pub fn is_not_found(&self) -> bool {
        self.code == StoreErrorCode::NotFound
    }
}

/// Result alias for store contracts.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::MustNotBeNegative {
            field: "quantity".to_string(),
        };
        assert_eq!(err.to_string(), "quantity must not be negative");
    }

    #[test]
    fn test_store_error_keeps_code_and_message() {
        let err = StoreError::new(StoreErrorCode::CheckViolation, "CHECK constraint failed: quantity")
            .with_native_code("275");
        assert_eq!(
            err.to_string(),
            "store error (check_violation): CHECK constraint failed: quantity"
        );
        assert_eq!(err.native_code.as_deref(), Some("275"));
        assert!(!err.is_not_found());
        assert!(StoreError::not_found("Product", "p-1").is_not_found());
    }
}
