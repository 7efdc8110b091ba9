//! # User Repository
//!
//! Local accounts backing the session provider.
//!
//! ## Sign-up Transaction
//! ```text
//! BEGIN
//!   INSERT INTO users    (id, email, password_hash, confirmed, created_at)
//!   INSERT INTO profiles (id, full_name, role = 'operator', created_at)
//! COMMIT   ← a user never exists without a profile
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use estoque_core::{Profile, Role};

/// A row of the `users` table.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    /// PHC string (argon2).
    pub password_hash: String,
    pub confirmed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Creates a user and its operator profile in one transaction.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - Email already registered
    pub async fn create(
        &self,
        email: &str,
        password_hash: &str,
        full_name: Option<&str>,
        confirmed: bool,
    ) -> DbResult<(UserRecord, Profile)> {
        let now = Utc::now();
        let user = UserRecord {
            id: Uuid::new_v4().to_string(),
            email: email.trim().to_lowercase(),
            password_hash: password_hash.to_string(),
            confirmed,
            created_at: now,
        };
        let profile = Profile {
            id: user.id.clone(),
            full_name: full_name.map(|n| n.trim().to_string()),
            role: Role::Operator,
            created_at: now,
        };

        debug!(id = %user.id, email = %user.email, "Creating user");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO users (id, email, password_hash, confirmed, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.confirmed)
        .bind(user.created_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO profiles (id, full_name, role, created_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&profile.id)
        .bind(&profile.full_name)
        .bind(profile.role)
        .bind(profile.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((user, profile))
    }

    /// Case-insensitive lookup.
    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            "SELECT id, email, password_hash, confirmed, created_at FROM users WHERE email = ?1",
        )
        .bind(email.trim().to_lowercase())
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            "SELECT id, email, password_hash, confirmed, created_at FROM users WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Marks a pending account as confirmed.
    pub async fn confirm(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("UPDATE users SET confirmed = 1 WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        Ok(())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
