use std::sync::Arc;

use bestiary_core::{CatalogStore, Config};

/// Shared application state
pub struct AppState {
    config: Config,
    store: Arc<CatalogStore>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<CatalogStore>) -> Self {
        Self { config, store }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &CatalogStore {
        self.store.as_ref()
    }
}
