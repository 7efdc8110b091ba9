//! # Schema Migrations
//!
//! The SQL files under `migrations/sqlite/` are compiled into the binary and
//! applied in filename order when a [`Database`](crate::Database) opens.
//!
//! ```text
//! migrations/sqlite/
//! └── 001_initial_schema.sql
//!       products             catalogue rows, CHECK quantity >= 0
//!       users                local accounts (argon2 hashes)
//!       profiles             role per user, cascades with users
//!       inventory_movements  append-only ledger, no FK to products
//! ```
//!
//! Applied files are recorded with their checksum in `_sqlx_migrations`;
//! editing one after it shipped makes every existing database refuse to
//! start. Add `002_...sql` instead.

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Embedded versus applied migrations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    pub embedded: usize,
    pub applied: usize,
    /// Descriptions of embedded migrations not yet applied.
    pub pending: Vec<String>,
}

impl MigrationStatus {
    pub fn is_current(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Applies whatever is pending. A no-op on an up-to-date database.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    let before = migration_status(pool).await?;
    if before.is_current() {
        debug!(applied = before.applied, "Schema up to date");
        return Ok(());
    }

    info!(pending = ?before.pending, "Applying migrations");
    MIGRATOR.run(pool).await?;
    Ok(())
}

/// Reads `_sqlx_migrations`; a fresh database counts as nothing applied.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<MigrationStatus> {
    let applied_versions: Vec<i64> =
        sqlx::query_scalar("SELECT version FROM _sqlx_migrations WHERE success = 1")
            .fetch_all(pool)
            .await
            .unwrap_or_default();

    let pending = MIGRATOR
        .iter()
        .filter(|m| !applied_versions.contains(&m.version))
        .map(|m| m.description.to_string())
        .collect();

    Ok(MigrationStatus {
        embedded: MIGRATOR.migrations.len(),
        applied: applied_versions.len(),
        pending,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_open_applies_everything() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let status = migration_status(db.pool()).await.unwrap();

        assert!(status.is_current());
        assert_eq!(status.embedded, status.applied);

        // second run finds nothing to do
        run_migrations(db.pool()).await.unwrap();
    }

    #[tokio::test]
    async fn test_fresh_database_has_everything_pending() {
        let db = Database::new(DbConfig::in_memory().run_migrations(false))
            .await
            .unwrap();
        let status = migration_status(db.pool()).await.unwrap();

        assert_eq!(status.applied, 0);
        assert_eq!(status.pending.len(), status.embedded);
        assert!(status.pending.iter().any(|d| d.contains("initial schema")));
    }
}
