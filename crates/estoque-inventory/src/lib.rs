//! # estoque-inventory: Inventory Service for Estoque
//!
//! The stateful layer between the presentation and the row-store: the
//! product mirror, the quantity ledger, sessions and the ambient stack.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         estoque-inventory                               │
//! │                                                                         │
//! │  ┌─────────────────────┐          ┌────────────────────────────────┐   │
//! │  │    AuthContext      │◄─events──│  SessionProvider               │   │
//! │  │  session + profile  │          │  (LocalSessionProvider:        │   │
//! │  │  watch<AuthSnapshot>│          │   argon2 + JWT over SQLite)    │   │
//! │  └──────────┬──────────┘          └────────────────────────────────┘   │
//! │             │ session binding                                           │
//! │             ▼                                                           │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   InventoryService                               │   │
//! │  │   ProductMirror (watch<Arc<Vec<Product>>>)                      │   │
//! │  │   create / update / remove / adjust_quantity / refresh          │   │
//! │  └──────────┬───────────────────────────────┬──────────────────────┘   │
//! │             ▼                               ▼                           │
//! │     Arc<dyn ProductStore>          Arc<dyn MovementLedger>             │
//! │             └──────────────┬────────────────┘                           │
//! │                            ▼                                            │
//! │              SqliteStore (estoque-db) │ MemoryStore                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`service`] - `InventoryService` and `AdjustOutcome`
//! - [`mirror`] - Snapshot state container with subscribers
//! - [`store`] - Store contracts and their SQLite implementation
//! - [`memory`] - In-memory stores with fault injection
//! - [`auth`] - Sessions, `AuthContext`, local provider, tokens
//! - [`users`] - Role administration
//! - [`binding`] - Follows the session into the service
//! - [`config`] - `AppConfig` (TOML + env)
//! - [`telemetry`] - `tracing` subscriber setup
//! - [`app`] - Startup wiring
//!
//! ## Usage
//!
//! ```rust,ignore
//! use estoque_inventory::App;
//!
//! let app = App::launch().await?;
//! app.auth.sign_in("ana@empresa.com", "segredo1").await?;
//!
//! let outcome = app.inventory.adjust_quantity(&product_id, 5).await;
//! if let Some(warning) = outcome.warning() {
//!     eprintln!("stock saved, history not: {warning}");
//! }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod app;
pub mod auth;
pub mod binding;
pub mod config;
pub mod error;
pub mod memory;
pub mod mirror;
pub mod service;
pub mod store;
pub mod telemetry;
pub mod users;

// =============================================================================
// Re-exports
// =============================================================================

pub use app::App;
pub use auth::{
    AuthContext, AuthSnapshot, LocalSessionProvider, Session, SessionEvent, SessionProvider,
    SignUpOutcome,
};
pub use binding::spawn_session_binding;
pub use config::AppConfig;
pub use error::{
    AuthError, AuthResult, ConfigError, InventoryError, InventoryResult, StartupError,
};
pub use memory::{Fault, MemoryStore};
pub use mirror::{ProductMirror, Snapshot};
pub use service::{AdjustOutcome, InventoryService};
pub use store::{MovementLedger, ProductStore, ProfileStore, SqliteStore};
pub use telemetry::init_tracing;
pub use users::UserAdmin;
