//! # Product Mirror
//!
//! The in-memory copy of the product catalogue that the presentation reads.
//!
//! ## State Container
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          ProductMirror                                  │
//! │                                                                         │
//! │   watch::Sender<Arc<Vec<Product>>>                                     │
//! │        │                                                                │
//! │        │  insert / replace / remove / replace_all / clear              │
//! │        │  (each one atomic, each one notifies once)                    │
//! │        ▼                                                                │
//! │   ┌──────────┐   ┌──────────┐   ┌──────────┐                           │
//! │   │ Receiver │   │ Receiver │   │ snapshot │  ← Arc clone, no copy     │
//! │   │ table    │   │ dashboard│   │ list()   │                           │
//! │   └──────────┘   └──────────┘   └──────────┘                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Snapshots are immutable; a write clones the vector only while an older
//! snapshot is still held somewhere. Entries are kept ordered by name.

use std::sync::Arc;

use estoque_core::Product;
use tokio::sync::watch;
use tracing::trace;

/// Immutable view of the catalogue at one point in time.
pub type Snapshot = Arc<Vec<Product>>;

#[derive(Debug)]
pub struct ProductMirror {
    tx: watch::Sender<Snapshot>,
}

impl Default for ProductMirror {
    fn default() -> Self {
        Self::new()
    }
}

fn sort_by_name(products: &mut [Product]) {
    products.sort_by(|a, b| a.name.cmp(&b.name));
}

impl ProductMirror {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Arc::new(Vec::new()));
        ProductMirror { tx }
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.tx.borrow().clone()
    }

    /// A receiver that sees every committed write.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.tx.subscribe()
    }

    pub fn get(&self, id: &str) -> Option<Product> {
        self.tx.borrow().iter().find(|p| p.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.tx.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tx.borrow().is_empty()
    }

    /// Replaces the whole catalogue.
    pub fn replace_all(&self, mut products: Vec<Product>) {
        sort_by_name(&mut products);
        trace!(count = products.len(), "Mirror replaced");
        self.tx.send_replace(Arc::new(products));
    }

    /// Adds a product created in the store.
    pub fn insert(&self, product: Product) {
        self.tx.send_modify(|snapshot| {
            let products = Arc::make_mut(snapshot);
            products.push(product);
            sort_by_name(products);
        });
    }

    /// Overwrites the entry with the same id.
    ///
    /// Returns `false` (and notifies nobody) when no entry has that id.
    pub fn replace(&self, product: Product) -> bool {
        self.tx.send_if_modified(|snapshot| {
            let Some(index) = snapshot.iter().position(|p| p.id == product.id) else {
                return false;
            };
            let products = Arc::make_mut(snapshot);
            products[index] = product;
            sort_by_name(products);
            true
        })
    }

    /// Drops the entry with `id`. Returns whether one was present.
    pub fn remove(&self, id: &str) -> bool {
        self.tx.send_if_modified(|snapshot| {
            if !snapshot.iter().any(|p| p.id == id) {
                return false;
            }
            Arc::make_mut(snapshot).retain(|p| p.id != id);
            true
        })
    }

    /// Empties the mirror (sign-out).
    pub fn clear(&self) {
        self.tx.send_replace(Arc::new(Vec::new()));
    }
}
