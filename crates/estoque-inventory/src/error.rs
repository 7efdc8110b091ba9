//! # Service Error Types
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ValidationError ─┐                                                    │
//! │                   ├──► InventoryError ──► caller (never retried)       │
//! │  StoreError ──────┤        Validation | NotFound | Store               │
//! │                   │                                                     │
//! │                   └──► AuthError ──► sign-in/up form                   │
//! │                                                                         │
//! │  io / toml ─────────► ConfigError ──► StartupError                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use estoque_core::{StoreError, ValidationError};
use thiserror::Error;

// =============================================================================
// Inventory Error
// =============================================================================

/// Failure of an Inventory Service operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    /// Input rejected before any store call.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The id is unknown to the mirror or the store.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The row-store refused or failed the request.
    #[error(transparent)]
    Store(StoreError),
}

impl InventoryError {
    pub fn product_not_found(id: &str) -> Self {
        InventoryError::NotFound {
            entity: "Product".to_string(),
            id: id.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, InventoryError::NotFound { .. })
    }
}

impl From<StoreError> for InventoryError {
    fn from(err: StoreError) -> Self {
        InventoryError::Store(err)
    }
}

pub type InventoryResult<T> = Result<T, InventoryError>;

// =============================================================================
// Auth Error
// =============================================================================

/// Failure reported by the session provider or the auth context.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Wrong email or password. Deliberately does not say which.
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("email already registered")]
    EmailTaken,

    #[error("email not confirmed")]
    EmailNotConfirmed,

    /// Expired, tampered or otherwise unusable session token.
    #[error("invalid session token: {0}")]
    InvalidToken(String),

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type AuthResult<T> = Result<T, AuthError>;

// =============================================================================
// Config Error
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config value for {key}: {reason}")]
    Invalid { key: String, reason: String },

    #[error("no config directory available on this platform")]
    NoConfigDir,
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Startup Error
// =============================================================================

/// Failure while wiring the application together.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Database could not be opened or migrated.
    #[error("database unavailable: {0}")]
    Database(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use estoque_core::StoreErrorCode;

    #[test]
    fn test_store_error_passes_through() {
        let store = StoreError::new(StoreErrorCode::PermissionDenied, "policy refused");
        let err: InventoryError = store.clone().into();
        assert_eq!(err, InventoryError::Store(store.clone()));
        assert_eq!(err.to_string(), store.to_string());
    }

    #[test]
    fn test_not_found_message() {
        let err = InventoryError::product_not_found("p-9");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Product not found: p-9");
    }
}
