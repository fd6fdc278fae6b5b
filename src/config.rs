// Configuration module for tailor
// Loads ~/.config/tailor/config.toml and overlays provider credentials
// from the environment.

mod provider_types;
mod types;

pub use provider_types::{AnthropicConfig, GeminiConfig, ProvidersConfig};
pub use types::{ClientConfig, Config, ServerConfig};

use std::fs;
use std::path::PathBuf;

/// Environment variable holding the Anthropic credential
pub const ANTHROPIC_API_KEY_VAR: &str = "ANTHROPIC_API_KEY";

/// Environment variable holding the Gemini credential
pub const GEMINI_API_KEY_VAR: &str = "GOOGLE_GENERATIVE_AI_API_KEY";

/// Environment variable overriding the listen address
pub const BIND_ADDR_VAR: &str = "TAILOR_BIND_ADDR";

/// Result of loading configuration
pub struct ConfigResult {
    pub config: Config,
    pub warning: Option<String>,
}

/// Loads configuration from ~/.config/tailor/config.toml and the environment.
///
/// Returns default configuration if the file doesn't exist or on parse
/// errors; environment credentials always win over file values.
pub fn load_config() -> ConfigResult {
    let mut result = read_config_file();
    apply_overrides(
        &mut result.config,
        std::env::var(ANTHROPIC_API_KEY_VAR).ok(),
        std::env::var(GEMINI_API_KEY_VAR).ok(),
        std::env::var(BIND_ADDR_VAR).ok(),
    );
    result
}

fn read_config_file() -> ConfigResult {
    let config_path = get_config_path();

    if !config_path.exists() {
        tracing::debug!(path = ?config_path, "config file does not exist, using defaults");
        return ConfigResult {
            config: Config::default(),
            warning: None,
        };
    }

    let contents = match fs::read_to_string(&config_path) {
        Ok(contents) => contents,
        Err(e) => {
            return ConfigResult {
                config: Config::default(),
                warning: Some(format!("Failed to read config: {}", e)),
            };
        }
    };

    match toml::from_str::<Config>(&contents) {
        Ok(config) => ConfigResult {
            config,
            warning: None,
        },
        Err(e) => ConfigResult {
            config: Config::default(),
            warning: Some(format!("Invalid config: {}", e)),
        },
    }
}

/// Overlay environment values onto a loaded configuration.
///
/// Blank values are ignored so that an empty exported variable does not
/// clobber a file-configured credential.
fn apply_overrides(
    config: &mut Config,
    anthropic_key: Option<String>,
    gemini_key: Option<String>,
    bind_addr: Option<String>,
) {
    if let Some(key) = anthropic_key.filter(|k| !k.trim().is_empty()) {
        config.providers.anthropic.api_key = Some(key);
    }
    if let Some(key) = gemini_key.filter(|k| !k.trim().is_empty()) {
        config.providers.gemini.api_key = Some(key);
    }
    if let Some(addr) = bind_addr.filter(|a| !a.trim().is_empty()) {
        config.server.bind_addr = addr;
    }
}

/// Returns the path to the configuration file
///
/// Always uses ~/.config/tailor/config.toml on all platforms for consistency.
fn get_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("tailor")
        .join("config.toml")
}
