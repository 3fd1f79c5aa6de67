use std::sync::Arc;

use store::DocumentStore;

use super::{
    config::{Config, ConfigError},
    database::init_store,
    ledger::Ledger,
};

pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn DocumentStore>,
    pub ledger: Ledger,
}

impl AppState {
    pub fn new() -> Result<Arc<Self>, ConfigError> {
        let config = Config::load()?;
        let store = init_store(&config);

        Ok(Self::with_store(config, store))
    }

    pub fn with_store(config: Config, store: Arc<dyn DocumentStore>) -> Arc<Self> {
        Arc::new(Self {
            config,
            store,
            ledger: Ledger::new(),
        })
    }
}
