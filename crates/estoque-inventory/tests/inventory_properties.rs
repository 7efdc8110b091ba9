//! Inventory Service behaviour against both the SQLite and the in-memory
//! backends.

use std::sync::Arc;

use async_trait::async_trait;
use estoque_core::{
    MovementType, Product, ProductChanges, ProductDraft, StoreError, StoreErrorCode, StoreResult,
};
use estoque_db::{Database, DbConfig};
use estoque_inventory::{
    AdjustOutcome, Fault, InventoryError, InventoryService, MemoryStore, ProductStore, SqliteStore,
};

fn draft(name: &str, price_cents: i64, quantity: i64) -> ProductDraft {
    ProductDraft {
        name: name.to_string(),
        category: "Eletrônicos".to_string(),
        price_cents,
        quantity,
        ..Default::default()
    }
}

async fn backends() -> Vec<(&'static str, InventoryService)> {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    vec![
        (
            "memory",
            InventoryService::with_store(Arc::new(MemoryStore::new())),
        ),
        (
            "sqlite",
            InventoryService::with_store(Arc::new(SqliteStore::new(db))),
        ),
    ]
}

#[tokio::test]
async fn monitor_adjusted_from_15_to_5_records_one_outbound_movement() {
    for (backend, service) in backends().await {
        let monitor = service.create(draft("Monitor", 89990, 15)).await.unwrap();

        let outcome = service.adjust_quantity(&monitor.id, 5).await;
        assert!(matches!(outcome, AdjustOutcome::Committed { .. }), "{backend}");
        assert_eq!(service.get(&monitor.id).unwrap().quantity, 5, "{backend}");

        let history = service.movements_for_product(&monitor.id).await.unwrap();
        assert_eq!(history.len(), 1, "{backend}");
        assert_eq!(history[0].movement.quantity_change, -10, "{backend}");
        assert_eq!(history[0].movement.movement_type, MovementType::Outbound);
        assert_eq!(history[0].product_name.as_deref(), Some("Monitor"));

        // same quantity again: success, nothing appended
        let again = service.adjust_quantity(&monitor.id, 5).await;
        assert!(matches!(
            again,
            AdjustOutcome::Committed { movement: None, .. }
        ));
        assert_eq!(service.get(&monitor.id).unwrap().quantity, 5);
        assert_eq!(service.movements().await.unwrap().len(), 1, "{backend}");
    }
}

#[tokio::test]
async fn create_adds_exactly_one_new_entry() {
    for (backend, service) in backends().await {
        let first = service.create(draft("Teclado", 24990, 3)).await.unwrap();
        let before: Vec<String> = service.list().iter().map(|p| p.id.clone()).collect();

        let second = service.create(draft("Mouse", 12990, 2)).await.unwrap();

        assert_eq!(service.list().len(), before.len() + 1, "{backend}");
        assert!(!before.contains(&second.id), "{backend}");
        assert_ne!(first.id, second.id);

        let names: Vec<String> = service.list().iter().map(|p| p.name.clone()).collect();
        assert_eq!(names, ["Mouse", "Teclado"], "{backend}");
    }
}

#[tokio::test]
async fn remove_keeps_orphaned_movements() {
    for (backend, service) in backends().await {
        let webcam = service.create(draft("Webcam", 19990, 8)).await.unwrap();
        for quantity in [10, 7, 9] {
            service
                .adjust_quantity(&webcam.id, quantity)
                .await
                .into_result()
                .unwrap();
        }

        service.remove(&webcam.id).await.unwrap();

        assert!(service.get(&webcam.id).is_none(), "{backend}");
        let history = service.movements_for_product(&webcam.id).await.unwrap();
        assert_eq!(history.len(), 3, "{backend}");
        assert!(history.iter().all(|r| r.product_name.is_none()), "{backend}");

        let mut deltas: Vec<i64> = history.iter().map(|r| r.movement.quantity_change).collect();
        deltas.sort_unstable();
        assert_eq!(deltas, vec![-3, 2, 2], "{backend}");
    }
}

#[tokio::test]
async fn adjust_of_unknown_id_is_not_found_without_mutation() {
    for (backend, service) in backends().await {
        service.create(draft("Mouse", 12990, 2)).await.unwrap();
        let before = service.list();

        let outcome = service.adjust_quantity("no-such-product", 4).await;

        match outcome {
            AdjustOutcome::Aborted(err) => assert!(err.is_not_found(), "{backend}"),
            other => panic!("{backend}: expected NotFound, got {other:?}"),
        }
        assert_eq!(*service.list(), *before, "{backend}");
        assert!(service.movements().await.unwrap().is_empty(), "{backend}");

        service.refresh().await.unwrap();
        assert_eq!(service.list().len(), 1, "{backend}");
    }
}

#[tokio::test]
async fn unknown_id_on_update_and_remove_is_not_found() {
    for (backend, service) in backends().await {
        let mut ghost = service.create(draft("Mouse", 12990, 2)).await.unwrap();
        ghost.id = "no-such-product".to_string();

        assert!(service.update(&ghost).await.unwrap_err().is_not_found(), "{backend}");
        assert!(service.remove(&ghost.id).await.unwrap_err().is_not_found(), "{backend}");
        assert_eq!(service.list().len(), 1, "{backend}");
    }
}

#[tokio::test]
async fn refresh_twice_yields_the_same_mirror() {
    for (backend, service) in backends().await {
        service.create(draft("Monitor", 89990, 15)).await.unwrap();
        service.create(draft("Cadeira", 59990, 0)).await.unwrap();

        assert_eq!(service.refresh().await.unwrap(), 2, "{backend}");
        let first = service.list();
        service.refresh().await.unwrap();
        let second = service.list();

        assert_eq!(*first, *second, "{backend}");
    }
}

#[tokio::test]
async fn update_with_new_quantity_bypasses_the_ledger() {
    for (backend, service) in backends().await {
        let mut mouse = service.create(draft("Mouse", 12990, 2)).await.unwrap();
        mouse.quantity = 20;
        mouse.brand = Some("Logitech".to_string());

        let stored = service.update(&mouse).await.unwrap();

        assert_eq!(stored.quantity, 20, "{backend}");
        assert_eq!(service.get(&mouse.id).unwrap().brand.as_deref(), Some("Logitech"));
        assert!(service.movements().await.unwrap().is_empty(), "{backend}");
    }
}

#[tokio::test]
async fn update_trims_name_and_category_on_every_backend() {
    for (backend, service) in backends().await {
        let mut mouse = service.create(draft("Mouse", 12990, 2)).await.unwrap();
        mouse.name = "  Mouse sem fio  ".to_string();
        mouse.category = " Informática ".to_string();

        let stored = service.update(&mouse).await.unwrap();

        assert_eq!(stored.name, "Mouse sem fio", "{backend}");
        assert_eq!(stored.category, "Informática", "{backend}");
        assert_eq!(service.get(&mouse.id).unwrap().name, "Mouse sem fio", "{backend}");
    }
}

#[tokio::test]
async fn invalid_draft_never_reaches_the_store() {
    for (backend, service) in backends().await {
        let err = service.create(draft("   ", 100, 1)).await.unwrap_err();
        assert!(matches!(err, InventoryError::Validation(_)), "{backend}");

        let err = service.create(draft("Mouse", 100, -1)).await.unwrap_err();
        assert!(matches!(err, InventoryError::Validation(_)), "{backend}");

        service.refresh().await.unwrap();
        assert!(service.list().is_empty(), "{backend}");
    }
}

#[tokio::test]
async fn store_failure_on_adjust_leaves_mirror_untouched() {
    let store = Arc::new(MemoryStore::new());
    let service = InventoryService::with_store(store.clone());
    let monitor = service.create(draft("Monitor", 89990, 15)).await.unwrap();
    store
        .fail_next(
            Fault::Update,
            StoreError::new(StoreErrorCode::PermissionDenied, "row policy refused"),
        )
        .await;

    let outcome = service.adjust_quantity(&monitor.id, 5).await;

    match outcome {
        AdjustOutcome::Aborted(InventoryError::Store(err)) => {
            assert_eq!(err.code, StoreErrorCode::PermissionDenied)
        }
        other => panic!("expected a store abort, got {other:?}"),
    }
    assert_eq!(service.get(&monitor.id).unwrap().quantity, 15);
    assert!(store.movements().await.is_empty());
}

#[tokio::test]
async fn ledger_failure_commits_with_warning() {
    let store = Arc::new(MemoryStore::new());
    let service = InventoryService::with_store(store.clone());
    let monitor = service.create(draft("Monitor", 89990, 15)).await.unwrap();
    store
        .fail_next(
            Fault::Append,
            StoreError::new(StoreErrorCode::Unavailable, "ledger offline"),
        )
        .await;

    let outcome = service.adjust_quantity(&monitor.id, 5).await;

    assert!(matches!(
        outcome,
        AdjustOutcome::CommittedWithWarning { ref product, .. } if product.quantity == 5
    ));
    assert_eq!(service.get(&monitor.id).unwrap().quantity, 5);
    assert_eq!(store.products().await[0].quantity, 5);
    assert!(store.movements().await.is_empty());
}

#[tokio::test]
async fn store_failure_on_create_is_all_or_nothing() {
    let store = Arc::new(MemoryStore::new());
    let service = InventoryService::with_store(store.clone());
    store
        .fail_next(
            Fault::Insert,
            StoreError::new(StoreErrorCode::Unavailable, "offline"),
        )
        .await;

    let err = service.create(draft("Monitor", 89990, 15)).await.unwrap_err();

    assert!(matches!(err, InventoryError::Store(_)));
    assert!(service.list().is_empty());
}

#[tokio::test]
async fn subscribers_see_each_committed_mutation() {
    let service = InventoryService::with_store(Arc::new(MemoryStore::new()));
    let mut rx = service.subscribe();
    rx.mark_unchanged();

    let mouse = service.create(draft("Mouse", 12990, 2)).await.unwrap();
    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().len(), 1);

    service.adjust_quantity(&mouse.id, 6).await.into_result().unwrap();
    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update()[0].quantity, 6);

    // an aborted operation does not notify
    let _ = service.adjust_quantity(&mouse.id, -1).await;
    assert!(!rx.has_changed().unwrap());

    service.remove(&mouse.id).await.unwrap();
    assert!(rx.has_changed().unwrap());
    assert!(rx.borrow_and_update().is_empty());
}

/// Yields once before every product write so two adjustments started
/// together both read the mirror before either stores.
struct YieldingProducts(Arc<MemoryStore>);

#[async_trait]
impl ProductStore for YieldingProducts {
    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        self.0.list_products().await
    }

    async fn insert_product(&self, draft: &ProductDraft) -> StoreResult<Product> {
        self.0.insert_product(draft).await
    }

    async fn update_product(&self, id: &str, changes: &ProductChanges) -> StoreResult<Product> {
        tokio::task::yield_now().await;
        self.0.update_product(id, changes).await
    }

    async fn delete_product(&self, id: &str) -> StoreResult<()> {
        self.0.delete_product(id).await
    }
}

#[tokio::test]
async fn overlapping_adjusts_keep_the_last_write_and_both_deltas() {
    let store = Arc::new(MemoryStore::new());
    let service = InventoryService::new(
        Arc::new(YieldingProducts(store.clone())),
        store.clone(),
    );
    let monitor = service.create(draft("Monitor", 89990, 15)).await.unwrap();

    let (down, up) = tokio::join!(
        service.adjust_quantity(&monitor.id, 10),
        service.adjust_quantity(&monitor.id, 20),
    );
    assert!(matches!(down, AdjustOutcome::Committed { movement: Some(_), .. }));
    assert!(matches!(up, AdjustOutcome::Committed { movement: Some(_), .. }));

    let stored = store.products().await[0].quantity;
    assert!(stored == 10 || stored == 20);
    assert_eq!(service.get(&monitor.id).unwrap().quantity, stored);

    let mut deltas: Vec<i64> = store
        .movements()
        .await
        .iter()
        .map(|m| m.quantity_change)
        .collect();
    deltas.sort_unstable();
    assert_eq!(deltas, vec![-5, 5]);

    // both deltas came from the stale 15, so the ledger no longer adds up
    let ledger_sum: i64 = deltas.iter().sum();
    assert_ne!(ledger_sum, stored - 15);
}
