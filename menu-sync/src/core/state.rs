use sqlx::SqlitePool;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use super::Config;
use super::error::{Result, ServerError};
use crate::catalog::{CatalogSource, HttpCatalogClient, StaticCatalog};
use crate::db::DbService;
use crate::menu::{
    CategoryRegistry, ConfigApi, MenuGroupManager, OverrideStore, SessionRegistry,
    SqliteOverrideStore, SyncOrchestrator,
};
use crate::platform::{HttpPlatformAdapter, PlatformAdapter};

/// Server state: shared handles to every service
///
/// Cloning is cheap; everything behind it is an `Arc` or a pool handle.
///
/// | Field | Description |
/// |-------|-------------|
/// | config | Immutable configuration |
/// | pool | SQLite pool |
/// | catalog | Catalog Service client |
/// | platform | Delivery platform adapter |
/// | store | Committed override store |
/// | sessions | Open edit sessions, one per menu group |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub pool: SqlitePool,
    pub catalog: Arc<dyn CatalogSource>,
    pub platform: Arc<dyn PlatformAdapter>,
    pub store: Arc<dyn OverrideStore>,
    pub sessions: Arc<SessionRegistry>,
}

impl ServerState {
    /// Assemble the state from already-built parts
    pub fn new(
        config: Config,
        pool: SqlitePool,
        catalog: Arc<dyn CatalogSource>,
        platform: Arc<dyn PlatformAdapter>,
    ) -> Self {
        let store: Arc<dyn OverrideStore> = Arc::new(SqliteOverrideStore::new(pool.clone()));
        Self {
            config,
            pool,
            catalog,
            platform,
            store,
            sessions: Arc::new(SessionRegistry::new()),
        }
    }

    /// Open the database and build the remote clients from `config`
    pub async fn initialize(config: &Config) -> Result<Self> {
        std::fs::create_dir_all(&config.work_dir).map_err(|source| ServerError::WorkDir {
            path: config.work_dir.clone(),
            source,
        })?;
        if let Some(parent) = Path::new(&config.database_path).parent() {
            std::fs::create_dir_all(parent).map_err(|source| ServerError::WorkDir {
                path: parent.display().to_string(),
                source,
            })?;
        }

        let db = DbService::new(&config.database_path).await?;
        let timeout = Duration::from_millis(config.platform_timeout_ms);

        let catalog: Arc<dyn CatalogSource> = match (&config.catalog_file, &config.catalog_url) {
            (Some(file), _) => Arc::new(StaticCatalog::from_file(file)?),
            (None, Some(url)) => Arc::new(HttpCatalogClient::new(url.clone(), timeout)?),
            (None, None) => {
                tracing::warn!("Neither CATALOG_FILE nor CATALOG_URL is set, serving an empty catalog");
                Arc::new(StaticCatalog::default())
            }
        };

        let platform: Arc<dyn PlatformAdapter> = Arc::new(HttpPlatformAdapter::new(
            config.platform_url.clone(),
            config.platform_token.clone(),
            timeout,
        )?);

        tracing::info!(
            tenant_id = %config.tenant_id,
            platform_url = %config.platform_url,
            environment = %config.environment,
            "Server state initialized"
        );
        Ok(Self::new(config.clone(), db.pool, catalog, platform))
    }

    pub fn registry(&self) -> CategoryRegistry {
        CategoryRegistry::new(self.pool.clone(), self.catalog.clone(), self.config.tenant_id.clone())
    }

    pub fn menu_groups(&self) -> MenuGroupManager {
        MenuGroupManager::new(self.pool.clone(), self.store.clone())
    }

    pub fn orchestrator(&self) -> SyncOrchestrator {
        SyncOrchestrator::new(
            self.pool.clone(),
            self.catalog.clone(),
            self.platform.clone(),
            self.store.clone(),
            self.config.modifier_fetch_concurrency,
        )
    }

    pub fn config_api(&self) -> ConfigApi {
        ConfigApi::new(self.pool.clone(), self.catalog.clone(), self.store.clone())
    }
}
