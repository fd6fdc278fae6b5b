// Provider configuration type definitions

use serde::Deserialize;

/// Default Anthropic model
fn default_anthropic_model() -> String {
    "claude-3-5-sonnet-20241022".to_string()
}

/// Default Gemini model
fn default_gemini_model() -> String {
    "gemini-1.5-pro-latest".to_string()
}

/// Anthropic-specific configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AnthropicConfig {
    /// API key; the ANTHROPIC_API_KEY environment variable overrides this
    pub api_key: Option<String>,
    /// Model to use
    #[serde(default = "default_anthropic_model")]
    pub model: String,
    /// Endpoint override, for tests and proxies
    pub api_url: Option<String>,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        AnthropicConfig {
            api_key: None,
            model: default_anthropic_model(),
            api_url: None,
        }
    }
}

impl AnthropicConfig {
    /// The configured credential, if present and non-empty.
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

/// Gemini-specific configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    /// API key; the GOOGLE_GENERATIVE_AI_API_KEY environment variable overrides this
    pub api_key: Option<String>,
    /// Model to use
    #[serde(default = "default_gemini_model")]
    pub model: String,
    /// Endpoint override, for tests and proxies
    pub api_url: Option<String>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        GeminiConfig {
            api_key: None,
            model: default_gemini_model(),
            api_url: None,
        }
    }
}

impl GeminiConfig {
    /// The configured credential, if present and non-empty.
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

/// Provider configuration section
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProvidersConfig {
    /// Primary provider
    #[serde(default)]
    pub anthropic: AnthropicConfig,
    /// Secondary (fallback) provider
    #[serde(default)]
    pub gemini: GeminiConfig,
}
