//! # Product Repository
//!
//! Database operations for the `products` table.
//!
//! ## Key Operations
//! - Full catalogue read ordered by name (what the mirror is built from)
//! - Insert with store-assigned id and timestamps
//! - Partial update by id, returning the stored row
//! - Hard delete (movements keep their `product_id`)
//!
//! ## Partial Updates
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ProductChanges { quantity: Some(5), ..Default::default() }             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  UPDATE products SET updated_at = ?, quantity = ?                      │
//! │  WHERE id = ? RETURNING ...                                            │
//! │       │                                                                 │
//! │       ├── row returned  → Ok(Product)                                  │
//! │       └── no row        → DbError::NotFound                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use estoque_core::{Product, ProductChanges, ProductDraft};

const PRODUCT_COLUMNS: &str = "id, name, category, price_cents, quantity, brand, model, \
                               serial_number, status, created_at, updated_at";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let created = repo.insert(&draft).await?;
/// let stored = repo.update(&created.id, &ProductChanges::quantity(5)).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists every product ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name, rowid");
        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Inserts a new product, assigning id, created_at and updated_at.
    ///
    /// ## Returns
    /// * `Ok(Product)` - The stored product
    /// * `Err(DbError::CheckViolation)` - Negative quantity/price or empty name
    pub async fn insert(&self, draft: &ProductDraft) -> DbResult<Product> {
        let now = Utc::now();
        let product = Product {
            id: generate_product_id(),
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

        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, category, price_cents, quantity,
                brand, model, serial_number, status,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.price_cents)
        .bind(product.quantity)
        .bind(&product.brand)
        .bind(&product.model)
        .bind(&product.serial_number)
        .bind(product.status)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product)
    }

    /// Applies `changes` to the product `id` and refreshes `updated_at`.
    ///
    /// Only the fields set in `changes` are written. An empty change set
    /// still touches `updated_at`.
    ///
    /// ## Returns
    /// * `Ok(Product)` - The row as stored after the update
    /// * `Err(DbError::NotFound)` - No product with that id
    pub async fn update(&self, id: &str, changes: &ProductChanges) -> DbResult<Product> {
        debug!(id = %id, quantity = ?changes.quantity, "Updating product");

        let mut query: QueryBuilder<'_, Sqlite> = QueryBuilder::new("UPDATE products SET updated_at = ");
        query.push_bind(Utc::now());

        if let Some(name) = &changes.name {
            query.push(", name = ").push_bind(name.trim().to_string());
        }
        if let Some(category) = &changes.category {
            query.push(", category = ").push_bind(category.trim().to_string());
        }
        if let Some(price_cents) = changes.price_cents {
            query.push(", price_cents = ").push_bind(price_cents);
        }
        if let Some(quantity) = changes.quantity {
            query.push(", quantity = ").push_bind(quantity);
        }
        if let Some(brand) = &changes.brand {
            query.push(", brand = ").push_bind(brand.clone());
        }
        if let Some(model) = &changes.model {
            query.push(", model = ").push_bind(model.clone());
        }
        if let Some(serial_number) = &changes.serial_number {
            query.push(", serial_number = ").push_bind(serial_number.clone());
        }
        if let Some(status) = changes.status {
            query.push(", status = ").push_bind(status);
        }

        query.push(" WHERE id = ").push_bind(id.to_string());
        query.push(" RETURNING ").push(PRODUCT_COLUMNS);

        query
            .build_query_as::<Product>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Deletes a product row. Its movements are left in place.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts products (for diagnostics and the seeder).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Helper to generate a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
