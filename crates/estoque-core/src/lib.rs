//! # estoque-core: Pure Domain Logic for Estoque
//!
//! Types, rules and aggregations of the IT-asset inventory, with no I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Estoque Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Presentation                                 │   │
//! │  │    Dashboard ──► Products ──► History ──► Reports ──► Users     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              estoque-inventory (service layer)                  │   │
//! │  │    InventoryService, AuthContext, UserAdmin, config, logging    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ estoque-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   stats   │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │ Dashboard │  │   rules   │  │   │
//! │  │   │  Movement │  │           │  │  report   │  │   access  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  estoque-db (Database Layer)                    │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Product, Movement, Profile, Role
//! - [`money`] - Money type with integer arithmetic
//! - [`error`] - ValidationError and the backend-neutral StoreError
//! - [`validation`] - Caller-side input checks
//! - [`access`] - Role to capability mapping for the interface
//! - [`stats`] - Dashboard cards, stock badge, product search
//! - [`report`] - History filter and report aggregations
//!
//! ## Example Usage
//!
//! ```rust
//! use estoque_core::money::Money;
//! use estoque_core::stats::StockLevel;
//!
//! let price = Money::parse("899,90").unwrap();
//! assert_eq!(price.cents(), 89990);
//! assert_eq!(price.multiply_quantity(15).cents(), 1_349_850);
//!
//! assert_eq!(StockLevel::classify(3, 5), StockLevel::Low);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod access;
pub mod error;
pub mod money;
pub mod report;
pub mod stats;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use access::{AccessGate, Capability};
pub use error::{StoreError, StoreErrorCode, StoreResult, ValidationError};
pub use money::Money;
pub use report::MovementFilter;
pub use stats::{DashboardStats, StockLevel};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Quantity at or below which a product counts as "estoque baixo".
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 5;

/// Categories offered by the product form.
pub const PRODUCT_CATEGORIES: [&str; 6] = [
    "Eletrônicos",
    "Informática",
    "Escritório",
    "Móveis",
    "Papelaria",
    "Outros",
];
