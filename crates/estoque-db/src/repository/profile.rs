//! # Profile Repository
//!
//! Display name and role per user id.

use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use estoque_core::{Profile, ProfileChanges};

#[derive(Debug, Clone)]
pub struct ProfileRepository {
    pool: SqlitePool,
}

impl ProfileRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProfileRepository { pool }
    }

    /// Gets the profile of a user.
    ///
    /// ## Returns
    /// * `Ok(Some(Profile))` - Profile found
    /// * `Ok(None)` - No profile row for that id
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(
            "SELECT id, full_name, role, created_at FROM profiles WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    /// All profiles, oldest first.
    pub async fn list(&self) -> DbResult<Vec<Profile>> {
        let profiles = sqlx::query_as::<_, Profile>(
            "SELECT id, full_name, role, created_at FROM profiles ORDER BY created_at, rowid",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(profiles)
    }

    /// Applies `changes` and returns the stored profile.
    pub async fn update(&self, id: &str, changes: &ProfileChanges) -> DbResult<Profile> {
        debug!(id = %id, role = ?changes.role, "Updating profile");

        if changes.full_name.is_none() && changes.role.is_none() {
            return self
                .get_by_id(id)
                .await?
                .ok_or_else(|| DbError::not_found("Profile", id));
        }

        let mut query: QueryBuilder<'_, Sqlite> = QueryBuilder::new("UPDATE profiles SET ");
        let mut fields = query.separated(", ");
        if let Some(full_name) = &changes.full_name {
            fields.push("full_name = ").push_bind_unseparated(full_name.clone());
        }
        if let Some(role) = changes.role {
            fields.push("role = ").push_bind_unseparated(role);
        }
        query.push(" WHERE id = ").push_bind(id.to_string());
        query.push(" RETURNING id, full_name, role, created_at");

        query
            .build_query_as::<Profile>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Profile", id))
    }
}

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use estoque_core::{ProfileChanges, Role};

    #[tokio::test]
    async fn test_role_update_and_listing() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (first, _) = db
            .users()
            .create("ana@empresa.com", "hash", Some("Ana Lima"), true)
            .await
            .unwrap();
        db.users()
            .create("bruno@empresa.com", "hash", Some("Bruno"), true)
            .await
            .unwrap();

        let profile = db.profiles().get_by_id(&first.id).await.unwrap().unwrap();
        assert_eq!(profile.role, Role::Operator);
        assert_eq!(profile.full_name.as_deref(), Some("Ana Lima"));

        let promoted = db
            .profiles()
            .update(&first.id, &ProfileChanges::role(Role::Administrator))
            .await
            .unwrap();
        assert_eq!(promoted.role, Role::Administrator);
        assert_eq!(promoted.full_name.as_deref(), Some("Ana Lima"));

        let all = db.profiles().list().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, first.id);
    }

    #[tokio::test]
    async fn test_update_missing_profile() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = db
            .profiles()
            .update("nobody", &ProfileChanges::role(Role::Operator))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
