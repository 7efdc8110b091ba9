//! # Inventory Service
//!
//! Owns the product mirror and mediates every catalogue mutation.
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        adjust_quantity(id, 5)                           │
//! │                                                                         │
//! │  1. 5 < 0 ?                          ──yes──► Aborted(Validation)      │
//! │  2. mirror.get(id)                   ──none─► Aborted(NotFound)        │
//! │  3. delta = 5 - mirror quantity                                        │
//! │  4. ProductStore::update_product     ──err──► Aborted(Store)           │
//! │        │                                      (mirror untouched)        │
//! │        ▼  phase one committed                                           │
//! │  5. delta != 0: MovementLedger::append ──err─► CommittedWithWarning    │
//! │  6. mirror.replace(stored product)                                     │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  Committed { product, movement }                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! There is no lock across the steps. Two concurrent adjustments of the same
//! product both compute their delta from the mirror; the store keeps the
//! last write and the ledger records both deltas.
//!
//! The service never checks roles; see [`estoque_core::access`].

use std::sync::Arc;

use estoque_core::validation::{validate_product, validate_product_draft, validate_quantity};
use estoque_core::{
    DashboardStats, Movement, MovementRecord, NewMovement, Product, ProductChanges, ProductDraft,
    StoreError, ValidationError, DEFAULT_LOW_STOCK_THRESHOLD,
};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::{InventoryError, InventoryResult};
use crate::mirror::{ProductMirror, Snapshot};
use crate::store::{MovementLedger, ProductStore};

// =============================================================================
// Adjust Outcome
// =============================================================================

/// Result of [`InventoryService::adjust_quantity`].
///
/// The quantity write and the ledger append are two separate store calls.
/// This type says which of them happened.
#[derive(Debug, Clone, PartialEq)]
pub enum AdjustOutcome {
    /// The quantity is stored and, when it changed, the movement recorded.
    Committed {
        product: Product,
        /// `None` when the new quantity equals the old one.
        movement: Option<Movement>,
    },

    /// The quantity is stored but the ledger append failed. Nothing was
    /// rolled back; the history is missing this change.
    CommittedWithWarning { product: Product, warning: StoreError },

    /// Nothing was written.
    Aborted(InventoryError),
}

impl AdjustOutcome {
    pub fn is_committed(&self) -> bool {
        !matches!(self, AdjustOutcome::Aborted(_))
    }

    /// The stored product, when the quantity write went through.
    pub fn product(&self) -> Option<&Product> {
        match self {
            AdjustOutcome::Committed { product, .. }
            | AdjustOutcome::CommittedWithWarning { product, .. } => Some(product),
            AdjustOutcome::Aborted(_) => None,
        }
    }

    pub fn movement(&self) -> Option<&Movement> {
        match self {
            AdjustOutcome::Committed { movement, .. } => movement.as_ref(),
            _ => None,
        }
    }

    pub fn warning(&self) -> Option<&StoreError> {
        match self {
            AdjustOutcome::CommittedWithWarning { warning, .. } => Some(warning),
            _ => None,
        }
    }

    /// Collapses to a plain result; a ledger warning counts as success.
    pub fn into_result(self) -> InventoryResult<Product> {
        match self {
            AdjustOutcome::Committed { product, .. }
            | AdjustOutcome::CommittedWithWarning { product, .. } => Ok(product),
            AdjustOutcome::Aborted(err) => Err(err),
        }
    }
}

// =============================================================================
// Inventory Service
// =============================================================================

/// Store-backed product catalogue with a subscribable in-memory mirror.
///
/// ## Usage
/// ```rust,ignore
/// let store = Arc::new(SqliteStore::new(db));
/// let service = InventoryService::with_store(store);
///
/// service.refresh().await?;
/// match service.adjust_quantity(&id, 5).await {
///     AdjustOutcome::Committed { .. } => {}
///     AdjustOutcome::CommittedWithWarning { warning, .. } => show_toast(warning),
///     AdjustOutcome::Aborted(err) => show_error(err),
/// }
/// ```
pub struct InventoryService {
    products: Arc<dyn ProductStore>,
    ledger: Arc<dyn MovementLedger>,
    mirror: ProductMirror,
    actor: watch::Sender<Option<String>>,
    low_stock_threshold: i64,
}

impl std::fmt::Debug for InventoryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InventoryService")
            .field("products", &self.mirror.len())
            .field("actor", &*self.actor.borrow())
            .field("low_stock_threshold", &self.low_stock_threshold)
            .finish()
    }
}

impl InventoryService {
    pub fn new(products: Arc<dyn ProductStore>, ledger: Arc<dyn MovementLedger>) -> Self {
        let (actor, _) = watch::channel(None);
        InventoryService {
            products,
            ledger,
            mirror: ProductMirror::new(),
            actor,
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
        }
    }

    /// One value implementing both contracts (SQLite or in-memory).
    pub fn with_store<S>(store: Arc<S>) -> Self
    where
        S: ProductStore + MovementLedger + 'static,
    {
        Self::new(store.clone(), store)
    }

    pub fn with_low_stock_threshold(mut self, threshold: i64) -> Self {
        self.low_stock_threshold = threshold;
        self
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Current mirror snapshot. No store round-trip.
    pub fn list(&self) -> Snapshot {
        self.mirror.snapshot()
    }

    pub fn get(&self, id: &str) -> Option<Product> {
        self.mirror.get(id)
    }

    /// Receiver notified after every committed mirror write.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.mirror.subscribe()
    }

    /// Dashboard cards for the current snapshot.
    pub fn dashboard(&self) -> DashboardStats {
        DashboardStats::compute(&self.mirror.snapshot(), self.low_stock_threshold)
    }

    /// Whole ledger joined with names, newest first.
    pub async fn movements(&self) -> InventoryResult<Vec<MovementRecord>> {
        Ok(self.ledger.list_movements().await?)
    }

    /// Ledger entries of one product id, which may no longer exist.
    pub async fn movements_for_product(&self, id: &str) -> InventoryResult<Vec<MovementRecord>> {
        Ok(self.ledger.list_for_product(id).await?)
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Sets the user id written as `performed_by` on new movements.
    pub fn bind_actor(&self, user_id: Option<String>) {
        debug!(actor = ?user_id, "Binding actor");
        self.actor.send_replace(user_id);
    }

    pub fn actor(&self) -> Option<String> {
        self.actor.borrow().clone()
    }

    /// Re-reads the catalogue and replaces the mirror wholesale.
    ///
    /// Returns the number of products loaded. On error the mirror keeps its
    /// previous contents.
    pub async fn refresh(&self) -> InventoryResult<usize> {
        let products = self.products.list_products().await?;
        let count = products.len();
        self.mirror.replace_all(products);

        info!(count, "Inventory refreshed");
        Ok(count)
    }

    /// Drops the mirror contents (sign-out).
    pub fn clear(&self) {
        self.mirror.clear();
        debug!("Inventory mirror cleared");
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Validates and stores a new product, then adds it to the mirror.
    pub async fn create(&self, draft: ProductDraft) -> InventoryResult<Product> {
        validate_product_draft(&draft)?;

        let product = self.products.insert_product(&draft).await?;
        self.mirror.insert(product.clone());

        info!(id = %product.id, name = %product.name, "Product created");
        Ok(product)
    }

    /// Overwrites every editable field of `product`.
    ///
    /// A changed quantity is written like any other field: no movement is
    /// recorded. Use [`adjust_quantity`](Self::adjust_quantity) for stock
    /// changes that belong in the history.
    pub async fn update(&self, product: &Product) -> InventoryResult<Product> {
        validate_product(product)?;

        let stored = self
            .products
            .update_product(&product.id, &product.to_changes())
            .await
            .map_err(|err| not_found_or_store(err, &product.id))?;
        self.mirror.replace(stored.clone());

        info!(id = %stored.id, "Product updated");
        Ok(stored)
    }

    /// Deletes a product. Its movements stay in the ledger.
    pub async fn remove(&self, id: &str) -> InventoryResult<()> {
        self.products
            .delete_product(id)
            .await
            .map_err(|err| not_found_or_store(err, id))?;
        self.mirror.remove(id);

        info!(id = %id, "Product removed");
        Ok(())
    }

    /// Sets the stock of `id` to `new_quantity` and records the difference.
    pub async fn adjust_quantity(&self, id: &str, new_quantity: i64) -> AdjustOutcome {
        if let Err(err) = validate_quantity(new_quantity) {
            return AdjustOutcome::Aborted(err.into());
        }

        let Some(current) = self.mirror.get(id) else {
            return AdjustOutcome::Aborted(InventoryError::product_not_found(id));
        };
        let old_quantity = current.quantity;

        debug!(id = %id, old = old_quantity, new = new_quantity, "Adjusting quantity");

        let product = match self
            .products
            .update_product(id, &ProductChanges::quantity(new_quantity))
            .await
        {
            Ok(product) => product,
            Err(err) => return AdjustOutcome::Aborted(not_found_or_store(err, id)),
        };

        let entry = NewMovement::for_adjustment(id, old_quantity, new_quantity, self.actor());
        let outcome = match entry {
            None => AdjustOutcome::Committed {
                product: product.clone(),
                movement: None,
            },
            Some(entry) => match self.ledger.append(&entry).await {
                Ok(movement) => AdjustOutcome::Committed {
                    product: product.clone(),
                    movement: Some(movement),
                },
                Err(warning) => {
                    warn!(
                        id = %id,
                        delta = entry.quantity_change,
                        error = %warning,
                        "Quantity stored but movement not recorded"
                    );
                    AdjustOutcome::CommittedWithWarning {
                        product: product.clone(),
                        warning,
                    }
                }
            },
        };

        self.mirror.replace(product);
        outcome
    }

    /// The "+" button: one unit more.
    pub async fn increment(&self, id: &str) -> AdjustOutcome {
        let Some(product) = self.mirror.get(id) else {
            return AdjustOutcome::Aborted(InventoryError::product_not_found(id));
        };
        match product.quantity.checked_add(1) {
            Some(next) => self.adjust_quantity(id, next).await,
            None => AdjustOutcome::Aborted(
                ValidationError::InvalidFormat {
                    field: "quantity".to_string(),
                    reason: "already at the largest storable value".to_string(),
                }
                .into(),
            ),
        }
    }

    /// The "-" button: one unit less. At zero nothing is written.
    pub async fn decrement(&self, id: &str) -> AdjustOutcome {
        match self.mirror.get(id) {
            Some(product) if product.quantity <= 0 => AdjustOutcome::Committed {
                product,
                movement: None,
            },
            Some(product) => self.adjust_quantity(id, product.quantity - 1).await,
            None => AdjustOutcome::Aborted(InventoryError::product_not_found(id)),
        }
    }
}

fn not_found_or_store(err: StoreError, id: &str) -> InventoryError {
    if err.is_not_found() {
        InventoryError::product_not_found(id)
    } else {
        InventoryError::Store(err)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{Fault, MemoryStore};
    use estoque_core::{MovementType, StoreErrorCode};

    fn draft(name: &str, price_cents: i64, quantity: i64) -> ProductDraft {
        ProductDraft {
            name: name.to_string(),
            category: "Eletrônicos".to_string(),
            price_cents,
            quantity,
            ..Default::default()
        }
    }

    fn service() -> (Arc<MemoryStore>, InventoryService) {
        let store = Arc::new(MemoryStore::new());
        let service = InventoryService::with_store(store.clone());
        (store, service)
    }

    #[tokio::test]
    async fn test_adjust_records_outbound_movement() {
        let (store, service) = service();
        let monitor = service.create(draft("Monitor", 89990, 15)).await.unwrap();

        let outcome = service.adjust_quantity(&monitor.id, 5).await;

        let movement = outcome.movement().cloned().unwrap();
        assert_eq!(movement.quantity_change, -10);
        assert_eq!(movement.movement_type, MovementType::Outbound);
        assert_eq!(
            movement.notes.as_deref(),
            Some("Quantidade ajustada de 15 para 5")
        );
        assert_eq!(service.get(&monitor.id).unwrap().quantity, 5);
        assert_eq!(store.movements().await.len(), 1);
    }

    #[tokio::test]
    async fn test_adjust_to_same_quantity_records_nothing() {
        let (store, service) = service();
        let mouse = service.create(draft("Mouse", 12990, 2)).await.unwrap();

        let outcome = service.adjust_quantity(&mouse.id, 2).await;

        assert!(matches!(
            outcome,
            AdjustOutcome::Committed { movement: None, .. }
        ));
        assert!(store.movements().await.is_empty());
    }

    #[tokio::test]
    async fn test_negative_quantity_aborts_before_store() {
        let (store, service) = service();
        let mouse = service.create(draft("Mouse", 12990, 2)).await.unwrap();
        let writes = store.product_writes();

        let outcome = service.adjust_quantity(&mouse.id, -1).await;

        assert_eq!(
            outcome,
            AdjustOutcome::Aborted(InventoryError::Validation(
                ValidationError::MustNotBeNegative {
                    field: "quantity".to_string()
                }
            ))
        );
        assert_eq!(store.product_writes(), writes);
    }

    #[tokio::test]
    async fn test_ledger_failure_is_a_warning() {
        let (store, service) = service();
        let webcam = service.create(draft("Webcam", 19990, 8)).await.unwrap();
        store
            .fail_next(Fault::Append, StoreError::new(StoreErrorCode::Unavailable, "down"))
            .await;

        let outcome = service.adjust_quantity(&webcam.id, 10).await;

        assert!(outcome.is_committed());
        assert_eq!(outcome.warning().unwrap().code, StoreErrorCode::Unavailable);
        assert_eq!(service.get(&webcam.id).unwrap().quantity, 10);
        assert!(store.movements().await.is_empty());
    }

    #[tokio::test]
    async fn test_decrement_at_zero_is_a_no_op() {
        let (store, service) = service();
        let chair = service.create(draft("Cadeira", 59990, 0)).await.unwrap();
        let writes = store.product_writes();

        let outcome = service.decrement(&chair.id).await;

        assert!(matches!(outcome, AdjustOutcome::Committed { movement: None, .. }));
        assert_eq!(store.product_writes(), writes);
    }

    #[tokio::test]
    async fn test_increment_and_decrement() {
        let (store, service) = service();
        let headset = service.create(draft("Fone", 14990, 4)).await.unwrap();

        service.increment(&headset.id).await.into_result().unwrap();
        service.decrement(&headset.id).await.into_result().unwrap();
        service.decrement(&headset.id).await.into_result().unwrap();

        assert_eq!(service.get(&headset.id).unwrap().quantity, 3);
        let deltas: Vec<i64> = store
            .movements()
            .await
            .iter()
            .map(|m| m.quantity_change)
            .collect();
        assert_eq!(deltas, vec![1, -1, -1]);
    }

    #[tokio::test]
    async fn test_increment_at_largest_quantity_is_rejected() {
        let (store, service) = service();
        let cable = service.create(draft("Cabo", 990, i64::MAX)).await.unwrap();

        let outcome = service.increment(&cable.id).await;

        assert!(matches!(
            outcome,
            AdjustOutcome::Aborted(InventoryError::Validation(ValidationError::InvalidFormat { .. }))
        ));
        assert_eq!(service.get(&cable.id).unwrap().quantity, i64::MAX);
        assert!(store.movements().await.is_empty());

        // the other direction still works
        service.decrement(&cable.id).await.into_result().unwrap();
        assert_eq!(service.get(&cable.id).unwrap().quantity, i64::MAX - 1);
    }

    #[tokio::test]
    async fn test_bound_actor_is_recorded() {
        let (store, service) = service();
        let mouse = service.create(draft("Mouse", 12990, 2)).await.unwrap();

        service.bind_actor(Some("user-1".to_string()));
        service.adjust_quantity(&mouse.id, 3).await.into_result().unwrap();

        assert_eq!(
            store.movements().await[0].performed_by.as_deref(),
            Some("user-1")
        );
    }

    #[tokio::test]
    async fn test_dashboard_uses_threshold() {
        let store = Arc::new(MemoryStore::new());
        let service = InventoryService::with_store(store).with_low_stock_threshold(2);
        service.create(draft("Mouse", 100, 2)).await.unwrap();
        service.create(draft("Teclado", 100, 3)).await.unwrap();

        let stats = service.dashboard();
        assert_eq!(stats.total_products, 2);
        assert_eq!(stats.low_stock_count, 1);
    }
}
