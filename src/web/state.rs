use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::{
    auth::{AuthService, monitor::SessionMonitor},
    catalog::CatalogStore,
    clock::{Clock, SystemClock},
    config::SiteConfig,
    storage::{FileBackend, Storage},
};

#[derive(Clone)]
pub struct AppState {
    config: Arc<SiteConfig>,
    storage: Storage,
    auth: AuthService,
    catalog: CatalogStore,
    monitor: SessionMonitor,
}

impl AppState {
    pub fn new(config: SiteConfig) -> Result<Self> {
        let storage = Storage::open(FileBackend::new(&config.storage_path)).with_context(|| {
            format!(
                "failed to open storage at {}",
                config.storage_path.display()
            )
        })?;
        info!(path = %config.storage_path.display(), "storage opened");

        let state = Self::with_storage(config, storage, Arc::new(SystemClock));
        state
            .catalog
            .ensure_defaults()
            .context("failed to seed default catalog")?;
        Ok(state)
    }

    pub fn with_storage(config: SiteConfig, storage: Storage, clock: Arc<dyn Clock>) -> Self {
        let auth = AuthService::new(
            config.admin.clone(),
            config.production,
            clock,
            config.auth_latency,
        );
        let catalog = CatalogStore::new(storage.clone());
        let monitor = SessionMonitor::new(storage.clone(), auth.clone());

        Self {
            config: Arc::new(config),
            storage,
            auth,
            catalog,
            monitor,
        }
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    pub fn monitor(&self) -> &SessionMonitor {
        &self.monitor
    }
}
