// Configuration type definitions

use serde::Deserialize;

use super::provider_types::ProvidersConfig;

/// Default service listen address
fn default_bind_addr() -> String {
    "127.0.0.1:8080".to_string()
}

/// Default service base URL for the client connector
fn default_base_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

/// Server configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Listen address; the TAILOR_BIND_ADDR environment variable overrides this
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_addr: default_bind_addr(),
        }
    }
}

/// Client connector configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the personalization service
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            base_url: default_base_url(),
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
}
