use std::sync::Arc;
use std::time::{Instant, SystemTime};

use parking_lot::{Mutex, MutexGuard};
use sspoe_core::offline::CacheManifest;
use sspoe_core::{Catalog, CatalogError, Controller};
use thiserror::Error;

use crate::config::Config;
use crate::host::BufferedHost;
use crate::store::FilePreferences;

pub type Player = Controller<FilePreferences, BufferedHost>;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("catalog unavailable: {0}")]
    Catalog(#[from] CatalogError),
}

#[derive(Clone)]
pub struct AppState {
    started_at: Instant,
    started_at_system: SystemTime,
    player: Arc<Mutex<Player>>,
    manifest: Arc<CacheManifest>,
}

impl AppState {
    pub fn from_config(config: &Config) -> Result<Self, StartupError> {
        let catalog = match &config.catalog_path {
            Some(path) => Catalog::from_path(path)?,
            None => Catalog::builtin()?,
        };
        tracing::info!(
            levels = catalog.levels.len(),
            source = %config
                .catalog_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "builtin".to_string()),
            "catalog loaded"
        );

        let store = FilePreferences::open(&config.data_dir);
        tracing::info!(path = %store.path().display(), "preferences store opened");

        Ok(Self::new(Controller::new(catalog, store, BufferedHost::new())))
    }

    pub fn new(player: Player) -> Self {
        Self {
            started_at: Instant::now(),
            started_at_system: SystemTime::now(),
            player: Arc::new(Mutex::new(player)),
            manifest: Arc::new(CacheManifest::default()),
        }
    }

    /// Exclusive access to the session for the duration of one request.
    pub fn player(&self) -> MutexGuard<'_, Player> {
        self.player.lock()
    }

    pub fn manifest(&self) -> &CacheManifest {
        &self.manifest
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn started_at_system(&self) -> SystemTime {
        self.started_at_system
    }
}
