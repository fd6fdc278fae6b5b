//! Anthropic Claude API client
//!
//! Non-streaming Messages API call over reqwest. The response text is the
//! concatenation of the returned content blocks.

use reqwest::Client;
use serde::Deserialize;

use super::ProviderError;

/// Anthropic API endpoint
const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";

/// Anthropic API version header
const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Clone)]
pub struct AnthropicClient {
    client: Client,
    api_key: String,
    model: String,
    api_url: String,
}

impl AnthropicClient {
    /// Create a new Anthropic client
    ///
    /// `api_url` overrides the production endpoint, for tests and proxies.
    pub fn new(api_key: String, model: String, api_url: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
            api_url: api_url.unwrap_or_else(|| ANTHROPIC_API_URL.to_string()),
        }
    }

    /// Returns the configured model (used in tests)
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns the endpoint URL (used in tests)
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Request a completion from the Messages API.
    pub async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String, ProviderError> {
        let request_body = serde_json::json!({
            "model": self.model,
            "max_tokens": max_tokens,
            "messages": [
                {
                    "role": "user",
                    "content": prompt
                }
            ]
        });

        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| ProviderError::Network {
                provider: "Anthropic".to_string(),
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            let code = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ProviderError::Api {
                provider: "Anthropic".to_string(),
                code,
                message,
            });
        }

        let body: MessagesResponse =
            response.json().await.map_err(|e| ProviderError::Parse {
                provider: "Anthropic".to_string(),
                message: e.to_string(),
            })?;

        Ok(body
            .content
            .iter()
            .filter_map(|block| block.text.as_deref())
            .collect::<String>())
    }
}

/// Subset of the Messages API response we consume.
#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}
