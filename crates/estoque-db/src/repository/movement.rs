//! # Movement Repository
//!
//! The append-only stock ledger (`inventory_movements`).
//!
//! Rows are never updated or deleted. `product_id` is a weak reference, so
//! reads LEFT JOIN the catalogue and report `product_name = None` for
//! products that no longer exist.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use estoque_core::{Movement, MovementRecord, NewMovement};

const RECORD_SELECT: &str = r#"
    SELECT
        m.id,
        m.product_id,
        m.quantity_change,
        m.movement_type,
        m.notes,
        m.performed_by,
        m.created_at,
        p.name AS product_name,
        p.category AS product_category,
        pr.full_name AS performed_by_name
    FROM inventory_movements m
    LEFT JOIN products p ON p.id = m.product_id
    LEFT JOIN profiles pr ON pr.id = m.performed_by
"#;

#[derive(Debug, Clone)]
pub struct MovementRepository {
    pool: SqlitePool,
}

impl MovementRepository {
    pub fn new(pool: SqlitePool) -> Self {
        MovementRepository { pool }
    }

    /// Appends an entry, assigning id and created_at.
    pub async fn append(&self, entry: &NewMovement) -> DbResult<Movement> {
        let movement = Movement {
            id: Uuid::new_v4().to_string(),
            product_id: entry.product_id.clone(),
            quantity_change: entry.quantity_change,
            movement_type: entry.movement_type,
            notes: entry.notes.clone(),
            performed_by: entry.performed_by.clone(),
            created_at: Utc::now(),
        };

        debug!(
            product_id = %movement.product_id,
            delta = movement.quantity_change,
            kind = movement.movement_type.label(),
            "Appending movement"
        );

        sqlx::query(
            r#"
            INSERT INTO inventory_movements (
                id, product_id, quantity_change, movement_type,
                notes, performed_by, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&movement.id)
        .bind(&movement.product_id)
        .bind(movement.quantity_change)
        .bind(movement.movement_type)
        .bind(&movement.notes)
        .bind(&movement.performed_by)
        .bind(movement.created_at)
        .execute(&self.pool)
        .await?;

        Ok(movement)
    }

    /// Whole ledger, newest first.
    pub async fn list(&self) -> DbResult<Vec<MovementRecord>> {
        let sql = format!("{RECORD_SELECT} ORDER BY m.created_at DESC, m.rowid DESC");
        let records = sqlx::query_as::<_, MovementRecord>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }

    /// Entries for one product id, newest first. Works for deleted products.
    pub async fn list_for_product(&self, product_id: &str) -> DbResult<Vec<MovementRecord>> {
        let sql = format!(
            "{RECORD_SELECT} WHERE m.product_id = ?1 ORDER BY m.created_at DESC, m.rowid DESC"
        );
        let records = sqlx::query_as::<_, MovementRecord>(&sql)
            .bind(product_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }
}
