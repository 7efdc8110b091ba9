//! # Application Wiring
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Application Startup                               │
//! │                                                                         │
//! │  1. AppConfig (file + env), validated                                  │
//! │  2. init_tracing(config.logging.filter)                                │
//! │  3. Database::new ─► SQLite (WAL), pending migrations                  │
//! │  4. SqliteStore ─► InventoryService, UserAdmin                         │
//! │  5. LocalSessionProvider ─► AuthContext                                │
//! │  6. spawn: auth listener, session binding                              │
//! │  7. AuthContext::initialize                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use estoque_core::StoreError;
use estoque_db::Database;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{AuthContext, JwtManager, LocalSessionProvider};
use crate::binding::spawn_session_binding;
use crate::config::AppConfig;
use crate::error::StartupError;
use crate::service::InventoryService;
use crate::store::SqliteStore;
use crate::telemetry::init_tracing;
use crate::users::UserAdmin;

/// Everything the presentation layer talks to.
pub struct App {
    pub config: AppConfig,
    pub inventory: Arc<InventoryService>,
    pub auth: Arc<AuthContext>,
    pub sessions: Arc<LocalSessionProvider>,
    pub users: UserAdmin,
    database: Database,
    tasks: Vec<JoinHandle<()>>,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("config", &self.config)
            .field("inventory", &self.inventory)
            .finish_non_exhaustive()
    }
}

impl App {
    /// Loads the config from the default location and starts.
    pub async fn launch() -> Result<Self, StartupError> {
        let config = AppConfig::load(None)?;
        init_tracing(Some(&config.logging.filter));
        Self::start(config).await
    }

    /// Opens the database and wires the services. Does not touch logging.
    pub async fn start(mut config: AppConfig) -> Result<Self, StartupError> {
        info!(path = ?config.database.path, "Starting Estoque");

        let database = Database::new(config.db_config())
            .await
            .map_err(StoreError::from)?;

        if config.auth.jwt_secret.is_empty() {
            warn!("No auth.jwt_secret configured; sessions will not survive a restart");
            config.auth.jwt_secret = Uuid::new_v4().to_string();
        }

        let store = Arc::new(SqliteStore::new(database.clone()));
        let inventory = Arc::new(
            InventoryService::with_store(store.clone())
                .with_low_stock_threshold(config.inventory.low_stock_threshold),
        );
        let users = UserAdmin::new(store.clone());

        let sessions = Arc::new(LocalSessionProvider::new(
            database.clone(),
            JwtManager::new(config.auth.jwt_secret.clone(), config.auth.session_lifetime_secs),
            config.auth.require_confirmation,
        ));
        let auth = Arc::new(AuthContext::new(sessions.clone(), store));

        let tasks = vec![
            auth.spawn_listener(),
            spawn_session_binding(auth.subscribe(), inventory.clone()),
        ];

        if let Err(err) = auth.initialize().await {
            warn!(error = %err, "Could not restore session");
        }

        info!("Estoque ready");
        Ok(App {
            config,
            inventory,
            auth,
            sessions,
            users,
            database,
            tasks,
        })
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Stops background tasks and closes the pool.
    pub async fn shutdown(self) {
        for task in &self.tasks {
            task.abort();
        }
        self.database.close().await;
        info!("Estoque stopped");
    }
}
