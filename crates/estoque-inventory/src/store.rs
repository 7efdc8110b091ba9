//! # Store Contracts
//!
//! The row-store seen from the service: three async traits, each with a
//! SQLite implementation over [`estoque_db::Database`].
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  InventoryService ──► Arc<dyn ProductStore>   ──┐                       │
//! │                  └──► Arc<dyn MovementLedger> ──┼──► SqliteStore        │
//! │  AuthContext     ──► Arc<dyn ProfileStore>   ──┘     (or MemoryStore)  │
//! │  UserAdmin       ──► Arc<dyn ProfileStore>                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every method returns [`StoreError`]; backend errors never leak past this
//! boundary.

use async_trait::async_trait;
use estoque_core::{
    Movement, MovementRecord, NewMovement, Product, ProductChanges, ProductDraft, Profile,
    ProfileChanges, StoreResult,
};
use estoque_db::Database;

// =============================================================================
// Contracts
// =============================================================================

/// The `products` collection.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Every product, ordered by name.
    async fn list_products(&self) -> StoreResult<Vec<Product>>;

    /// Stores a new product; the store assigns id and timestamps.
    async fn insert_product(&self, draft: &ProductDraft) -> StoreResult<Product>;

    /// Writes the given fields, refreshes `updated_at`, returns the stored row.
    async fn update_product(&self, id: &str, changes: &ProductChanges) -> StoreResult<Product>;

    async fn delete_product(&self, id: &str) -> StoreResult<()>;
}

/// The append-only movement ledger.
#[async_trait]
pub trait MovementLedger: Send + Sync {
    async fn append(&self, entry: &NewMovement) -> StoreResult<Movement>;

    /// Whole ledger joined with product and performer names, newest first.
    async fn list_movements(&self) -> StoreResult<Vec<MovementRecord>>;

    /// Entries for one product id, newest first, including orphans.
    async fn list_for_product(&self, product_id: &str) -> StoreResult<Vec<MovementRecord>>;
}

/// Role and display name per user.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn fetch_profile(&self, user_id: &str) -> StoreResult<Option<Profile>>;

    async fn update_profile(&self, user_id: &str, changes: &ProfileChanges)
        -> StoreResult<Profile>;

    /// All profiles, oldest first.
    async fn list_profiles(&self) -> StoreResult<Vec<Profile>>;
}

// =============================================================================
// SQLite
// =============================================================================

/// All three contracts over one database handle.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        SqliteStore { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl ProductStore for SqliteStore {
    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        Ok(self.db.products().list().await?)
    }

    async fn insert_product(&self, draft: &ProductDraft) -> StoreResult<Product> {
        Ok(self.db.products().insert(draft).await?)
    }

    async fn update_product(&self, id: &str, changes: &ProductChanges) -> StoreResult<Product> {
        Ok(self.db.products().update(id, changes).await?)
    }

    async fn delete_product(&self, id: &str) -> StoreResult<()> {
        Ok(self.db.products().delete(id).await?)
    }
}

#[async_trait]
impl MovementLedger for SqliteStore {
    async fn append(&self, entry: &NewMovement) -> StoreResult<Movement> {
        Ok(self.db.movements().append(entry).await?)
    }

    async fn list_movements(&self) -> StoreResult<Vec<MovementRecord>> {
        Ok(self.db.movements().list().await?)
    }

    async fn list_for_product(&self, product_id: &str) -> StoreResult<Vec<MovementRecord>> {
        Ok(self.db.movements().list_for_product(product_id).await?)
    }
}

#[async_trait]
impl ProfileStore for SqliteStore {
    async fn fetch_profile(&self, user_id: &str) -> StoreResult<Option<Profile>> {
        Ok(self.db.profiles().get_by_id(user_id).await?)
    }

    async fn update_profile(
        &self,
        user_id: &str,
        changes: &ProfileChanges,
    ) -> StoreResult<Profile> {
        Ok(self.db.profiles().update(user_id, changes).await?)
    }

    async fn list_profiles(&self) -> StoreResult<Vec<Profile>> {
        Ok(self.db.profiles().list().await?)
    }
}
