//! Ties the Inventory Service to the signed-in user.
//!
//! ```text
//! AuthSnapshot (watch) ──► user id changed?
//!                            ├── Some(id): bind_actor(id), refresh()
//!                            └── None:     bind_actor(None), clear()
//! ```
//!
//! Token refreshes for the same user do not reload the catalogue.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::auth::AuthSnapshot;
use crate::service::InventoryService;

/// Runs until the auth context is dropped.
pub fn spawn_session_binding(
    mut auth: watch::Receiver<AuthSnapshot>,
    service: Arc<InventoryService>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut bound: Option<String> = None;

        loop {
            let user_id = auth.borrow_and_update().user_id().map(str::to_string);

            if user_id != bound {
                bound = user_id.clone();
                match user_id {
                    Some(id) => {
                        debug!(user_id = %id, "Binding inventory to session");
                        service.bind_actor(Some(id));
                        if let Err(err) = service.refresh().await {
                            error!(error = %err, "Failed to load products for session");
                        }
                    }
                    None => {
                        debug!("Session ended, clearing inventory");
                        service.bind_actor(None);
                        service.clear();
                    }
                }
            }

            if auth.changed().await.is_err() {
                break;
            }
        }
    })
}
