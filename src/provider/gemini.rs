//! Gemini API client
//!
//! Non-streaming call to the Google Generative Language API over reqwest.
//! The response text is the concatenation of the first candidate's parts.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::ProviderError;

/// Gemini API endpoint
const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    api_url: String,
}

impl GeminiClient {
    /// Create a new Gemini client
    ///
    /// `api_url` overrides the production endpoint, for tests and proxies.
    pub fn new(api_key: String, model: String, api_url: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
            api_url: api_url.unwrap_or_else(|| GEMINI_API_URL.to_string()),
        }
    }

    /// Returns the stored API key (used in tests)
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Returns the stored model (used in tests)
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Build the request body JSON for the Gemini API
    fn build_request_body(&self, prompt: &str, max_tokens: u32) -> Result<String, ProviderError> {
        #[derive(Serialize)]
        struct Part {
            text: String,
        }

        #[derive(Serialize)]
        struct Content {
            role: String,
            parts: Vec<Part>,
        }

        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct GenerationConfig {
            max_output_tokens: u32,
        }

        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct RequestBody {
            contents: Vec<Content>,
            generation_config: GenerationConfig,
        }

        let body = RequestBody {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: max_tokens,
            },
        };

        serde_json::to_string(&body).map_err(|e| ProviderError::Parse {
            provider: "Gemini".to_string(),
            message: format!("Failed to serialize request body: {}", e),
        })
    }

    /// Construct URL: `{api_url}/{model}:generateContent?key={api_key}`
    fn build_url(&self) -> String {
        format!(
            "{}/{}:generateContent?key={}",
            self.api_url, self.model, self.api_key
        )
    }

    /// Request a completion from the Gemini API.
    pub async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String, ProviderError> {
        let body = self.build_request_body(prompt, max_tokens)?;
        let url = self.build_url();

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| ProviderError::Network {
                provider: "Gemini".to_string(),
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            let code = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ProviderError::Api {
                provider: "Gemini".to_string(),
                code,
                message,
            });
        }

        let body: GenerateContentResponse =
            response.json().await.map_err(|e| ProviderError::Parse {
                provider: "Gemini".to_string(),
                message: e.to_string(),
            })?;

        Ok(body
            .candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|part| part.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default())
    }
}

/// Subset of the generateContent response we consume.
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}
