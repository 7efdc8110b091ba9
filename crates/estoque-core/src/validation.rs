//! # Validation Module
//!
//! Caller-side checks that run before any store request.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Form (frontend)                                              │
//! │  └── Immediate feedback on empty fields                                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Inventory Service / Auth Context                             │
//! │  └── THIS MODULE: name, price, quantity, email, password               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Row-store                                                    │
//! │  ├── NOT NULL / CHECK (quantity >= 0, price_cents >= 0)                │
//! │  └── Access policies                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use estoque_core::validation::{validate_quantity, validate_price_cents};
//!
//! assert!(validate_quantity(0).is_ok());
//! assert!(validate_price_cents(0).is_err()); // forms require a positive price
//! ```

use crate::error::ValidationError;
use crate::types::{Product, ProductDraft};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NAME_LEN: usize = 200;
const MAX_CATEGORY_LEN: usize = 100;
const MAX_ATTRIBUTE_LEN: usize = 120;
const MIN_PASSWORD_LEN: usize = 6;
const MIN_FULL_NAME_LEN: usize = 3;

// =============================================================================
// String Validators
// =============================================================================

fn required_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

fn optional_text(field: &str, value: Option<&str>) -> ValidationResult<()> {
    match value {
        Some(v) if v.chars().count() > MAX_ATTRIBUTE_LEN => Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_ATTRIBUTE_LEN,
        }),
        _ => Ok(()),
    }
}

/// Validates a product name: non-empty after trimming, at most 200 characters.
///
/// ```rust
/// use estoque_core::validation::validate_product_name;
///
/// assert!(validate_product_name("Monitor LED 24\"").is_ok());
/// assert!(validate_product_name("   ").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    required_text("name", name, MAX_NAME_LEN)
}

/// Validates a category: non-empty, at most 100 characters.
pub fn validate_category(category: &str) -> ValidationResult<()> {
    required_text("category", category, MAX_CATEGORY_LEN)
}

/// Validates a search query and returns it trimmed. Empty is allowed.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a stock quantity: zero or more.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a price entered in a product form: strictly positive.
///
/// The store itself accepts zero; the forms never did.
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "price".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Product Validators
// =============================================================================

/// Validates everything a create request carries.
pub fn validate_product_draft(draft: &ProductDraft) -> ValidationResult<()> {
    validate_product_name(&draft.name)?;
    validate_category(&draft.category)?;
    validate_price_cents(draft.price_cents)?;
    validate_quantity(draft.quantity)?;
    optional_text("brand", draft.brand.as_deref())?;
    optional_text("model", draft.model.as_deref())?;
    optional_text("serial_number", draft.serial_number.as_deref())?;
    Ok(())
}

/// Validates a full product value submitted by the edit form.
pub fn validate_product(product: &Product) -> ValidationResult<()> {
    validate_uuid(&product.id)?;
    validate_product_name(&product.name)?;
    validate_category(&product.category)?;
    validate_price_cents(product.price_cents)?;
    validate_quantity(product.quantity)?;
    optional_text("brand", product.brand.as_deref())?;
    optional_text("model", product.model.as_deref())?;
    optional_text("serial_number", product.serial_number.as_deref())?;
    Ok(())
}

// =============================================================================
// Account Validators
// =============================================================================

/// Validates an email address (shape only: `local@domain.tld`).
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    let invalid = || ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: "must look like name@example.com".to_string(),
    };

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty()
        || domain.contains('@')
        || email.chars().any(char::is_whitespace)
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
    {
        return Err(invalid());
    }

    Ok(())
}

/// Validates a password: at least 6 characters.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LEN,
        });
    }

    Ok(())
}

/// Validates the full name given at sign-up: at least 3 characters.
pub fn validate_full_name(full_name: &str) -> ValidationResult<()> {
    if full_name.trim().chars().count() < MIN_FULL_NAME_LEN {
        return Err(ValidationError::TooShort {
            field: "full_name".to_string(),
            min: MIN_FULL_NAME_LEN,
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string.
///
/// ```rust
/// use estoque_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ProductDraft {
        ProductDraft {
            name: "Monitor".to_string(),
            category: "Eletrônicos".to_string(),
            price_cents: 89990,
            quantity: 15,
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("Teclado Mecânico").is_ok());
        assert!(validate_product_name("").is_err());
        assert!(validate_product_name(&"A".repeat(201)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(0).is_ok());
        assert!(validate_quantity(15).is_ok());
        assert_eq!(
            validate_quantity(-1),
            Err(ValidationError::MustNotBeNegative {
                field: "quantity".to_string()
            })
        );
    }

    #[test]
    fn test_validate_price_cents() {
        assert!(validate_price_cents(1).is_ok());
        assert!(validate_price_cents(0).is_err());
        assert!(validate_price_cents(-100).is_err());
    }

    #[test]
    fn test_validate_product_draft() {
        assert!(validate_product_draft(&draft()).is_ok());

        let mut missing_category = draft();
        missing_category.category = " ".to_string();
        assert_eq!(
            validate_product_draft(&missing_category),
            Err(ValidationError::Required {
                field: "category".to_string()
            })
        );

        let mut long_serial = draft();
        long_serial.serial_number = Some("X".repeat(500));
        assert!(validate_product_draft(&long_serial).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("ana@empresa.com.br").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("ana").is_err());
        assert!(validate_email("ana@empresa").is_err());
        assert!(validate_email("@empresa.com").is_err());
        assert!(validate_email("a b@empresa.com").is_err());
        assert!(validate_email("a@@empresa.com").is_err());
    }

    #[test]
    fn test_validate_password_and_name() {
        assert!(validate_password("123456").is_ok());
        assert!(validate_password("12345").is_err());
        assert!(validate_full_name("Ana Lima").is_ok());
        assert!(validate_full_name(" Al ").is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("").is_err());
        assert!(validate_uuid("123").is_err());
    }
}
