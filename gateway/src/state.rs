use std::sync::Arc;

use crate::{
    config::Config,
    services::backend::AuthBackend,
    services::{backend::HttpAuthBackend, mock_backend::MockAuthBackend},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub backend: Arc<dyn AuthBackend>,
}

impl AppState {
    pub fn new(config: Config, backend: Arc<dyn AuthBackend>) -> Self {
        Self { config, backend }
    }

    /// Picks the backend implementation from configuration.
    pub fn from_config(config: Config) -> Self {
        let backend: Arc<dyn AuthBackend> = if config.use_mock_backend {
            Arc::new(MockAuthBackend::new())
        } else {
            Arc::new(HttpAuthBackend::new(config.backend_base_url.clone()))
        };
        Self::new(config, backend)
    }
}
