//! Shared application state.

use std::sync::Arc;

use crate::config::Config;
use crate::provider::ProviderGateway;

/// State available to all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Provider gateway used for every generation.
    pub gateway: Arc<ProviderGateway>,

    /// Application configuration.
    pub config: Arc<Config>,
}

impl AppState {
    /// Create application state from configuration.
    pub fn new(config: Config) -> Self {
        let gateway = ProviderGateway::from_config(&config.providers);
        Self {
            gateway: Arc::new(gateway),
            config: Arc::new(config),
        }
    }

    /// Create application state with an explicit gateway (used in tests).
    pub fn with_gateway(config: Config, gateway: ProviderGateway) -> Self {
        Self {
            gateway: Arc::new(gateway),
            config: Arc::new(config),
        }
    }
}
