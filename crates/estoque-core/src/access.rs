//! # Access Gate
//!
//! Maps roles to what the interface lets them do.
//!
//! ## Not a Security Boundary
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Presentation ── AccessGate::allows() ──► hide/disable buttons          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  InventoryService ── trusts the caller, no role checks                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Row-store policies ── the only place a request is actually refused     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! Everything in this module is a usability guard. A client that skips it
//! can still send any request; authorization has to be enforced by the
//! row-store policy engine.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::{Profile, Role};

/// An action the interface can offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ViewInventory,
    ViewHistory,
    ViewReports,
    AdjustQuantity,
    CreateProduct,
    UpdateProduct,
    RemoveProduct,
    ManageUsers,
}

impl Capability {
    /// Capabilities reserved for administrators.
    pub fn is_admin_only(&self) -> bool {
        matches!(
            self,
            Capability::CreateProduct
                | Capability::UpdateProduct
                | Capability::RemoveProduct
                | Capability::ManageUsers
        )
    }
}

impl Role {
    pub fn allows(&self, capability: Capability) -> bool {
        match self {
            Role::Administrator => true,
            Role::Operator => !capability.is_admin_only(),
        }
    }
}

/// Role check for whoever is signed in (or nobody).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccessGate {
    role: Option<Role>,
}

impl AccessGate {
    /// Gate for a loaded profile; `None` (signed out or profile missing)
    /// allows nothing.
    pub fn for_profile(profile: Option<&Profile>) -> Self {
        AccessGate {
            role: profile.map(|p| p.role),
        }
    }

    pub fn for_role(role: Role) -> Self {
        AccessGate { role: Some(role) }
    }

    pub fn allows(&self, capability: Capability) -> bool {
        self.role.is_some_and(|role| role.allows(capability))
    }

    pub fn is_admin(&self) -> bool {
        self.role == Some(Role::Administrator)
    }
}
