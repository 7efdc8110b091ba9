//! User administration: list profiles and flip a user's role.

use std::sync::Arc;

use estoque_core::{Profile, ProfileChanges};
use tracing::info;

use crate::error::{InventoryError, InventoryResult};
use crate::store::ProfileStore;

#[derive(Clone)]
pub struct UserAdmin {
    profiles: Arc<dyn ProfileStore>,
}

impl std::fmt::Debug for UserAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserAdmin").finish_non_exhaustive()
    }
}

impl UserAdmin {
    pub fn new(profiles: Arc<dyn ProfileStore>) -> Self {
        UserAdmin { profiles }
    }

    /// All profiles, oldest account first.
    pub async fn list_users(&self) -> InventoryResult<Vec<Profile>> {
        Ok(self.profiles.list_profiles().await?)
    }

    /// Switches admin to operator and back. Returns the updated profile.
    pub async fn toggle_role(&self, user_id: &str) -> InventoryResult<Profile> {
        let current = self
            .profiles
            .fetch_profile(user_id)
            .await?
            .ok_or_else(|| InventoryError::NotFound {
                entity: "Profile".to_string(),
                id: user_id.to_string(),
            })?;

        let role = current.role.toggled();
        let updated = self
            .profiles
            .update_profile(user_id, &ProfileChanges::role(role))
            .await?;

        info!(user_id = %user_id, role = role.as_str(), "Role changed");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use chrono::Utc;
    use estoque_core::Role;

    #[tokio::test]
    async fn test_toggle_role_round_trip() {
        let store = Arc::new(MemoryStore::new());
        store
            .insert_profile(Profile {
                id: "u-1".to_string(),
                full_name: Some("Ana Lima".to_string()),
                role: Role::Operator,
                created_at: Utc::now(),
            })
            .await;
        let admin = UserAdmin::new(store);

        assert_eq!(admin.toggle_role("u-1").await.unwrap().role, Role::Administrator);
        assert_eq!(admin.toggle_role("u-1").await.unwrap().role, Role::Operator);
        assert_eq!(admin.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_toggle_unknown_user() {
        let admin = UserAdmin::new(Arc::new(MemoryStore::new()));
        assert!(admin.toggle_role("ghost").await.unwrap_err().is_not_found());
    }
}
