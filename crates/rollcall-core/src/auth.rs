//! Authorization oracle.
//!
//! Answers "may this identity do that?" for every gated action. Admin
//! membership lives in the store; the root admin comes from configuration
//! and is written to the store once at startup.

use std::sync::Arc;

use rollcall_models::UserId;
use rollcall_persistence::{Result, Store};
use tracing::{debug, info};

/// Admin and root checks backed by the store's admin set.
#[derive(Clone)]
pub struct AuthOracle {
    store: Arc<dyn Store>,
    root: UserId,
}

impl AuthOracle {
    pub fn new(store: Arc<dyn Store>, root: UserId) -> Self {
        Self { store, root }
    }

    /// Whether `user_id` is the root admin.
    pub fn is_root(&self, user_id: UserId) -> bool {
        user_id == self.root
    }

    /// Whether `user_id` holds admin privileges.
    ///
    /// The root admin always does, whatever the store says.
    pub async fn is_admin(&self, user_id: UserId) -> Result<bool> {
        if self.is_root(user_id) {
            return Ok(true);
        }
        let admin = self.store.is_admin(user_id).await?;
        debug!(user_id = %user_id, admin, "Checked admin membership");
        Ok(admin)
    }

    /// Make sure the root admin is in the stored admin set. Idempotent.
    pub async fn ensure_root_admin(&self) -> Result<()> {
        self.store.add_admin(self.root).await?;
        info!(root = %self.root, "Root admin registered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollcall_persistence::MemoryStore;

    #[tokio::test]
    async fn test_ensure_root_admin_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        let oracle = AuthOracle::new(store.clone(), UserId(1));

        oracle.ensure_root_admin().await.unwrap();
        oracle.ensure_root_admin().await.unwrap();

        assert_eq!(store.list_admins().await.unwrap(), vec![UserId(1)]);
    }

    #[tokio::test]
    async fn test_admin_checks() {
        let store = Arc::new(MemoryStore::new());
        let oracle = AuthOracle::new(store.clone(), UserId(1));

        assert!(oracle.is_admin(UserId(1)).await.unwrap());
        assert!(!oracle.is_admin(UserId(2)).await.unwrap());

        store.add_admin(UserId(2)).await.unwrap();
        store.add_admin(UserId(3)).await.unwrap();
        assert!(oracle.is_admin(UserId(2)).await.unwrap());
        assert!(oracle.is_root(UserId(1)));
        assert!(!oracle.is_root(UserId(2)));
    }
}
