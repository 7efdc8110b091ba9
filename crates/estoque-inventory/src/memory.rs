//! # In-Memory Stores
//!
//! A [`MemoryStore`] implements every store contract over plain vectors.
//! It backs service tests and demos that should not touch SQLite, and it
//! can be told to fail the next call of a given kind:
//!
//! ```rust,ignore
//! let store = Arc::new(MemoryStore::new());
//! store.fail_next(Fault::Append, StoreError::new(StoreErrorCode::Unavailable, "down")).await;
//! // the next ledger append returns that error, later ones succeed
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use estoque_core::{
    Movement, MovementRecord, NewMovement, Product, ProductChanges, ProductDraft, Profile,
    ProfileChanges, StoreError, StoreErrorCode, StoreResult,
};

use crate::store::{MovementLedger, ProductStore, ProfileStore};

/// Which call an injected failure applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fault {
    ListProducts,
    Insert,
    Update,
    Delete,
    Append,
    FetchProfile,
    UpdateProfile,
}

#[derive(Debug, Default)]
struct State {
    products: Vec<Product>,
    movements: Vec<Movement>,
    profiles: Vec<Profile>,
    faults: HashMap<Fault, StoreError>,
}

impl State {
    fn take_fault(&mut self, fault: Fault) -> StoreResult<()> {
        match self.faults.remove(&fault) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn record(&self, movement: &Movement) -> MovementRecord {
        let product = self.products.iter().find(|p| p.id == movement.product_id);
        let performer = movement
            .performed_by
            .as_deref()
            .and_then(|id| self.profiles.iter().find(|p| p.id == id));

        MovementRecord {
            movement: movement.clone(),
            product_name: product.map(|p| p.name.clone()),
            product_category: product.map(|p| p.category.clone()),
            performed_by_name: performer.and_then(|p| p.full_name.clone()),
        }
    }

    /// Newest first; insertion order breaks timestamp ties.
    fn records<'a>(
        &self,
        movements: impl DoubleEndedIterator<Item = &'a Movement>,
    ) -> Vec<MovementRecord> {
        let mut records: Vec<MovementRecord> = movements.rev().map(|m| self.record(m)).collect();
        records.sort_by(|a, b| b.movement.created_at.cmp(&a.movement.created_at));
        records
    }
}

fn check_quantity(quantity: i64) -> StoreResult<()> {
    if quantity < 0 {
        return Err(StoreError::new(
            StoreErrorCode::CheckViolation,
            "CHECK constraint failed: quantity >= 0",
        ));
    }
    Ok(())
}

/// Product store, movement ledger and profile store in one value.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    product_writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with the given products (ids and timestamps kept as given).
    pub fn with_products(products: Vec<Product>) -> Self {
        MemoryStore {
            state: Mutex::new(State {
                products,
                ..Default::default()
            }),
            product_writes: AtomicUsize::new(0),
        }
    }

    /// The next call of kind `fault` returns `err` instead of doing anything.
    pub async fn fail_next(&self, fault: Fault, err: StoreError) {
        self.state.lock().await.faults.insert(fault, err);
    }

    pub async fn insert_profile(&self, profile: Profile) {
        self.state.lock().await.profiles.push(profile);
    }

    /// Raw ledger contents in append order.
    pub async fn movements(&self) -> Vec<Movement> {
        self.state.lock().await.movements.clone()
    }

    /// Raw product rows, bypassing any fault.
    pub async fn products(&self) -> Vec<Product> {
        self.state.lock().await.products.clone()
    }

    /// Insert, update and delete calls that reached the store, failed or not.
    pub fn product_writes(&self) -> usize {
        self.product_writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        let mut state = self.state.lock().await;
        state.take_fault(Fault::ListProducts)?;

        let mut products = state.products.clone();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    async fn insert_product(&self, draft: &ProductDraft) -> StoreResult<Product> {
        self.product_writes.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().await;
        state.take_fault(Fault::Insert)?;
        check_quantity(draft.quantity)?;

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: draft.name.trim().to_string(),
            category: draft.category.trim().to_string(),
            price_cents: draft.price_cents,
            quantity: draft.quantity,
            brand: draft.brand.clone(),
            model: draft.model.clone(),
            serial_number: draft.serial_number.clone(),
            status: draft.status,
            created_at: now,
            updated_at: now,
        };
        state.products.push(product.clone());
        Ok(product)
    }

    async fn update_product(&self, id: &str, changes: &ProductChanges) -> StoreResult<Product> {
        self.product_writes.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().await;
        state.take_fault(Fault::Update)?;
        if let Some(quantity) = changes.quantity {
            check_quantity(quantity)?;
        }

        let product = state
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::not_found("Product", id))?;
        changes.apply_to(product);
        product.updated_at = Utc::now();
        Ok(product.clone())
    }

    async fn delete_product(&self, id: &str) -> StoreResult<()> {
        self.product_writes.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().await;
        state.take_fault(Fault::Delete)?;

        let before = state.products.len();
        state.products.retain(|p| p.id != id);
        if state.products.len() == before {
            return Err(StoreError::not_found("Product", id));
        }
        Ok(())
    }
}

#[async_trait]
impl MovementLedger for MemoryStore {
    async fn append(&self, entry: &NewMovement) -> StoreResult<Movement> {
        let mut state = self.state.lock().await;
        state.take_fault(Fault::Append)?;

        let movement = Movement {
            id: Uuid::new_v4().to_string(),
            product_id: entry.product_id.clone(),
            quantity_change: entry.quantity_change,
            movement_type: entry.movement_type,
            notes: entry.notes.clone(),
            performed_by: entry.performed_by.clone(),
            created_at: Utc::now(),
        };
        state.movements.push(movement.clone());
        Ok(movement)
    }

    async fn list_movements(&self) -> StoreResult<Vec<MovementRecord>> {
        let state = self.state.lock().await;
        Ok(state.records(state.movements.iter()))
    }

    async fn list_for_product(&self, product_id: &str) -> StoreResult<Vec<MovementRecord>> {
        let state = self.state.lock().await;
        Ok(state.records(state.movements.iter().filter(|m| m.product_id == product_id)))
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn fetch_profile(&self, user_id: &str) -> StoreResult<Option<Profile>> {
        let mut state = self.state.lock().await;
        state.take_fault(Fault::FetchProfile)?;
        Ok(state.profiles.iter().find(|p| p.id == user_id).cloned())
    }

    async fn update_profile(
        &self,
        user_id: &str,
        changes: &ProfileChanges,
    ) -> StoreResult<Profile> {
        let mut state = self.state.lock().await;
        state.take_fault(Fault::UpdateProfile)?;

        let profile = state
            .profiles
            .iter_mut()
            .find(|p| p.id == user_id)
            .ok_or_else(|| StoreError::not_found("Profile", user_id))?;
        if let Some(full_name) = &changes.full_name {
            profile.full_name = full_name.clone();
        }
        if let Some(role) = changes.role {
            profile.role = role;
        }
        Ok(profile.clone())
    }

    async fn list_profiles(&self) -> StoreResult<Vec<Profile>> {
        let state = self.state.lock().await;
        let mut profiles = state.profiles.clone();
        profiles.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(profiles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use estoque_core::MovementType;

    fn draft(name: &str, quantity: i64) -> ProductDraft {
        ProductDraft {
            name: name.to_string(),
            category: "Informática".to_string(),
            price_cents: 100,
            quantity,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_injected_fault_fires_once() {
        let store = MemoryStore::new();
        store
            .fail_next(Fault::Insert, StoreError::new(StoreErrorCode::Unavailable, "down"))
            .await;

        assert!(store.insert_product(&draft("Mouse", 1)).await.is_err());
        assert!(store.insert_product(&draft("Mouse", 1)).await.is_ok());
        assert_eq!(store.product_writes(), 2);
    }

    #[tokio::test]
    async fn test_orphaned_records_lose_product_name() {
        let store = MemoryStore::new();
        let product = store.insert_product(&draft("Mouse", 1)).await.unwrap();
        let entry = NewMovement::for_adjustment(&product.id, 1, 3, None).unwrap();
        store.append(&entry).await.unwrap();

        store.delete_product(&product.id).await.unwrap();

        let records = store.list_for_product(&product.id).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].product_name, None);
        assert_eq!(records[0].movement.movement_type, MovementType::Inbound);
    }

    #[tokio::test]
    async fn test_negative_quantity_is_check_violation() {
        let store = MemoryStore::new();
        let product = store.insert_product(&draft("Mouse", 1)).await.unwrap();
        let err = store
            .update_product(&product.id, &ProductChanges::quantity(-1))
            .await
            .unwrap_err();
        assert_eq!(err.code, StoreErrorCode::CheckViolation);
    }
}
