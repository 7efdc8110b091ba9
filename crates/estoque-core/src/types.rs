//! # Domain Types
//!
//! Core domain types used throughout Estoque.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    Movement     │   │    Profile      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │◄──│  product_id     │   │  id (user id)   │       │
//! │  │  name/category  │   │  (weak ref)     │   │  full_name      │       │
//! │  │  price_cents    │   │  quantity_change│   │  role           │       │
//! │  │  quantity       │   │  movement_type  │   └─────────────────┘       │
//! │  │  status         │   │  notes          │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A Movement keeps its `product_id` after the product is deleted; history
//! outlives the catalogue.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Product Status
// =============================================================================

/// Lifecycle status of an IT asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    Available,
    InUse,
    Maintenance,
    Discarded,
}

impl ProductStatus {
    pub const ALL: [ProductStatus; 4] = [
        ProductStatus::Available,
        ProductStatus::InUse,
        ProductStatus::Maintenance,
        ProductStatus::Discarded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Available => "available",
            ProductStatus::InUse => "in_use",
            ProductStatus::Maintenance => "maintenance",
            ProductStatus::Discarded => "discarded",
        }
    }
}

impl std::str::FromStr for ProductStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProductStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown product status: '{s}'"))
    }
}

// =============================================================================
// Product
// =============================================================================

/// An inventory item as stored in the Product Store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Store-assigned identifier (UUID v4).
    pub id: String,

    /// Display name. Never empty.
    pub name: String,

    pub category: String,

    /// Unit price in cents. Never negative.
    pub price_cents: i64,

    /// Units in stock. Never negative.
    pub quantity: i64,

    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub status: Option<ProductStatus>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the unit price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Price × quantity; the "Valor Total" column of the product table.
    #[inline]
    pub fn stock_value(&self) -> Money {
        self.price().multiply_quantity(self.quantity)
    }

    /// The full field set of this product, for the overwrite path of `update`.
    pub fn to_changes(&self) -> ProductChanges {
        ProductChanges {
            name: Some(self.name.clone()),
            category: Some(self.category.clone()),
            price_cents: Some(self.price_cents),
            quantity: Some(self.quantity),
            brand: Some(self.brand.clone()),
            model: Some(self.model.clone()),
            serial_number: Some(self.serial_number.clone()),
            status: Some(self.status),
        }
    }
}

/// Everything needed to create a product; id and timestamps come from the store.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductDraft {
    pub name: String,
    pub category: String,
    pub price_cents: i64,
    pub quantity: i64,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub status: Option<ProductStatus>,
}

/// A partial field set for "update by id".
///
/// `None` leaves a column untouched. For nullable columns the inner option
/// distinguishes "set to NULL" (`Some(None)`) from "leave as is" (`None`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price_cents: Option<i64>,
    pub quantity: Option<i64>,
    pub brand: Option<Option<String>>,
    pub model: Option<Option<String>>,
    pub serial_number: Option<Option<String>>,
    pub status: Option<Option<ProductStatus>>,
}

impl ProductChanges {
    /// Only the quantity; what a stock adjustment writes.
    pub fn quantity(quantity: i64) -> Self {
        ProductChanges {
            quantity: Some(quantity),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == ProductChanges::default()
    }

    /// Applies the change set onto an existing product (used by in-memory stores).
    ///
    /// Name and category are trimmed, as the SQLite repository does.
    pub fn apply_to(&self, product: &mut Product) {
        if let Some(name) = &self.name {
            product.name = name.trim().to_string();
        }
        if let Some(category) = &self.category {
            product.category = category.trim().to_string();
        }
        if let Some(price_cents) = self.price_cents {
            product.price_cents = price_cents;
        }
        if let Some(quantity) = self.quantity {
            product.quantity = quantity;
        }
        if let Some(brand) = &self.brand {
            product.brand = brand.clone();
        }
        if let Some(model) = &self.model {
            product.model = model.clone();
        }
        if let Some(serial_number) = &self.serial_number {
            product.serial_number = serial_number.clone();
        }
        if let Some(status) = self.status {
            product.status = status;
        }
    }
}

// =============================================================================
// Movement
// =============================================================================

/// Direction of a stock movement. Serialized with the labels the history
/// page and the ledger table use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[ts(export)]
pub enum MovementType {
    /// Stock came in (positive delta).
    #[serde(rename = "entrada")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "entrada"))]
    Inbound,

    /// Stock went out (negative delta).
    #[serde(rename = "saída")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "saída"))]
    Outbound,
}

impl MovementType {
    /// Derives the label from a quantity delta; zero has no movement.
    pub fn from_delta(delta: i64) -> Option<Self> {
        match delta {
            d if d > 0 => Some(MovementType::Inbound),
            d if d < 0 => Some(MovementType::Outbound),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MovementType::Inbound => "entrada",
            MovementType::Outbound => "saída",
        }
    }
}

/// An immutable ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Movement {
    pub id: String,

    /// Weak reference: the product may no longer exist.
    pub product_id: String,

    /// Signed, never zero.
    pub quantity_change: i64,

    pub movement_type: MovementType,

    pub notes: Option<String>,

    /// User id of whoever made the change, when known.
    pub performed_by: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A ledger entry before the store assigns id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMovement {
    pub product_id: String,
    pub quantity_change: i64,
    pub movement_type: MovementType,
    pub notes: Option<String>,
    pub performed_by: Option<String>,
}

impl NewMovement {
    /// Builds the entry for a quantity adjustment from `old` to `new`.
    ///
    /// Returns `None` when nothing changed.
    pub fn for_adjustment(
        product_id: &str,
        old: i64,
        new: i64,
        performed_by: Option<String>,
    ) -> Option<Self> {
        let delta = new - old;
        let movement_type = MovementType::from_delta(delta)?;
        Some(NewMovement {
            product_id: product_id.to_string(),
            quantity_change: delta,
            movement_type,
            notes: Some(format!("Quantidade ajustada de {old} para {new}")),
            performed_by,
        })
    }
}

/// A movement joined with what is still known about its product and actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct MovementRecord {
    #[serde(flatten)]
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub movement: Movement,

    /// `None` once the product has been deleted.
    pub product_name: Option<String>,
    pub product_category: Option<String>,

    /// Display name of `movement.performed_by`.
    pub performed_by_name: Option<String>,
}

// =============================================================================
// Users and Roles
// =============================================================================

/// What a user may do in the interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[ts(export)]
pub enum Role {
    #[serde(rename = "admin")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "admin"))]
    Administrator,

    /// New accounts start here.
    #[default]
    #[serde(rename = "operator")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "operator"))]
    Operator,
}

impl Role {
    /// The other role; what the user-management page toggles to.
    pub fn toggled(&self) -> Role {
        match self {
            Role::Administrator => Role::Operator,
            Role::Operator => Role::Administrator,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Administrator => "admin",
            Role::Operator => "operator",
        }
    }
}

/// Role and display name attached to a user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Profile {
    pub id: String,
    pub full_name: Option<String>,
    pub role: Role,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Fields a profile update may touch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProfileChanges {
    pub full_name: Option<Option<String>>,
    pub role: Option<Role>,
}

impl ProfileChanges {
    pub fn role(role: Role) -> Self {
        ProfileChanges {
            role: Some(role),
            ..Default::default()
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
