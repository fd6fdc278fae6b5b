//! Text-generation provider gateway
//!
//! Defines the TextGenerator backends, ProviderError types, and the gateway
//! that tries an ordered list of capability-equivalent providers until one
//! succeeds. The gateway never propagates an error: terminal failure comes
//! back as an error-shaped ProviderResponse.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ProvidersConfig;

mod anthropic;
mod gemini;

pub use anthropic::AnthropicClient;
pub use gemini::GeminiClient;

/// Surfaced when neither provider credential is configured.
pub const NO_PROVIDERS_MESSAGE: &str = "No LLM API keys configured. Please set \
    ANTHROPIC_API_KEY or GOOGLE_GENERATIVE_AI_API_KEY.";

/// Errors that can occur while calling a text-generation provider
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProviderError {
    /// Provider is not configured (missing credential)
    #[error("[{provider}] not configured: {message}")]
    NotConfigured { provider: String, message: String },

    /// Network error during the API request
    #[error("[{provider}] network error: {message}")]
    Network { provider: String, message: String },

    /// API returned an error response
    #[error("[{provider}] API error ({code}): {message}")]
    Api {
        provider: String,
        code: u16,
        message: String,
    },

    /// Failed to parse the API response
    #[error("[{provider}] parse error: {message}")]
    Parse { provider: String, message: String },
}

/// Which backend produced a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Anthropic,
    Gemini,
    Error,
}

/// Normalized result of a generation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderResponse {
    pub text: String,
    pub provider: ProviderId,
    pub error: Option<String>,
}

impl ProviderResponse {
    /// An error-shaped response with empty text.
    pub fn failure(message: impl Into<String>) -> Self {
        ProviderResponse {
            text: String::new(),
            provider: ProviderId::Error,
            error: Some(message.into()),
        }
    }

    /// True when the response cannot be used: the error provider id, or an
    /// empty body from an otherwise successful call.
    pub fn is_error(&self) -> bool {
        self.provider == ProviderId::Error || self.text.is_empty()
    }
}

/// A single text-generation backend.
#[derive(Debug, Clone)]
pub enum TextGenerator {
    Anthropic(AnthropicClient),
    Gemini(GeminiClient),
}

impl TextGenerator {
    /// Returns the display name of the backend
    pub fn provider_name(&self) -> &'static str {
        match self {
            TextGenerator::Anthropic(_) => "Anthropic",
            TextGenerator::Gemini(_) => "Gemini",
        }
    }

    pub fn id(&self) -> ProviderId {
        match self {
            TextGenerator::Anthropic(_) => ProviderId::Anthropic,
            TextGenerator::Gemini(_) => ProviderId::Gemini,
        }
    }

    /// Send a prompt to this backend and return the generated text.
    pub async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String, ProviderError> {
        match self {
            TextGenerator::Anthropic(client) => client.generate(prompt, max_tokens).await,
            TextGenerator::Gemini(client) => client.generate(prompt, max_tokens).await,
        }
    }
}

/// Ordered list of backends tried in sequence until one succeeds.
///
/// Anthropic is the primary, Gemini the secondary; each joins the list only
/// when its credential is configured. One hop per backend, no retries.
#[derive(Debug, Clone, Default)]
pub struct ProviderGateway {
    generators: Vec<TextGenerator>,
}

impl ProviderGateway {
    pub fn new(generators: Vec<TextGenerator>) -> Self {
        ProviderGateway { generators }
    }

    /// Build the gateway from provider configuration.
    ///
    /// Credentials are expected to already carry any environment overrides
    /// (see [`crate::config::load_config`]).
    pub fn from_config(config: &ProvidersConfig) -> Self {
        let mut generators = Vec::new();

        if let Some(api_key) = config.anthropic.credential() {
            generators.push(TextGenerator::Anthropic(AnthropicClient::new(
                api_key.to_string(),
                config.anthropic.model.clone(),
                config.anthropic.api_url.clone(),
            )));
        }

        if let Some(api_key) = config.gemini.credential() {
            generators.push(TextGenerator::Gemini(GeminiClient::new(
                api_key.to_string(),
                config.gemini.model.clone(),
                config.gemini.api_url.clone(),
            )));
        }

        ProviderGateway { generators }
    }

    /// True when at least one backend has a credential.
    pub fn is_configured(&self) -> bool {
        !self.generators.is_empty()
    }

    /// Backend names in fallback order.
    pub fn provider_names(&self) -> Vec<&'static str> {
        self.generators.iter().map(TextGenerator::provider_name).collect()
    }

    /// Generate text for a prompt, falling back through the backend list.
    ///
    /// Failures are logged and swallowed; when every backend fails (or none
    /// is configured) the result has `provider == Error` and empty text.
    pub async fn generate(&self, prompt: &str, max_tokens: u32) -> ProviderResponse {
        if self.generators.is_empty() {
            return ProviderResponse::failure(NO_PROVIDERS_MESSAGE);
        }

        let mut last_error: Option<ProviderError> = None;

        for generator in &self.generators {
            match generator.generate(prompt, max_tokens).await {
                Ok(text) => {
                    return ProviderResponse {
                        text,
                        provider: generator.id(),
                        error: None,
                    };
                }
                Err(e) => {
                    tracing::warn!(
                        provider = generator.provider_name(),
                        error = %e,
                        "generation failed, falling back to next provider"
                    );
                    last_error = Some(e);
                }
            }
        }

        let message = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "Unknown error occurred".to_string());
        ProviderResponse::failure(message)
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod provider_tests;
