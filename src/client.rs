//! Personalization service client
//!
//! Thin reqwest wrappers over the service endpoints with the connector's
//! failure semantics: describe and rewrite swallow transport errors into an
//! error field, personalize surfaces a typed error (with a connection hint)
//! so callers can disable auto-personalization.

use std::collections::BTreeSet;

use reqwest::Client;
use serde::Serialize;
use thiserror::Error;

use crate::preferences::PreferenceSet;
use crate::recommendation::{self, PersonalizationResponse, Status};
use crate::server::{DescribeRequest, GenerateRequest, TextResponse};

/// Errors surfaced by the personalize call.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The service host could not be reached.
    #[error("could not reach personalization service at {base_url}: {message}")]
    Connection { base_url: String, message: String },

    /// The service answered with a non-success status.
    #[error("personalization request failed with status {code}")]
    Status { code: u16 },

    /// The service answered with a body we could not decode.
    #[error("malformed personalization response: {message}")]
    Malformed { message: String },

    /// The service reported an error-status recommendation.
    #[error("personalization service returned error status")]
    ErrorStatus,
}

/// Uniform result of the describe and rewrite calls.
///
/// `text` always holds something usable (possibly empty for describe, the
/// original markdown for rewrite); `error` records what went wrong.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextOutcome {
    pub text: String,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ServiceClient {
    http: Client,
    base_url: String,
}

impl ServiceClient {
    /// Create a client for the service at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `POST /describe` - fetch the 2-4 word reader description.
    ///
    /// Never fails: transport and status errors come back as an empty text
    /// with the error recorded.
    pub async fn fetch_user_description(
        &self,
        tags: &BTreeSet<String>,
        free_text: &str,
    ) -> TextOutcome {
        let body = DescribeRequest {
            selected_options: tags.clone(),
            custom_prompt: free_text.to_string(),
        };

        match self.post_text("/describe", &body).await {
            Ok(text) => TextOutcome { text, error: None },
            Err(e) => {
                tracing::warn!(error = %e, "describe request failed");
                TextOutcome {
                    text: String::new(),
                    error: Some(e.to_string()),
                }
            }
        }
    }

    /// `POST /generate` - fetch the rewritten Markdown.
    ///
    /// Never fails: on any error the original markdown comes back unchanged
    /// with the error recorded.
    pub async fn fetch_modified_markdown(
        &self,
        markdown: &str,
        preferences: &PreferenceSet,
    ) -> TextOutcome {
        let body = GenerateRequest::Structured {
            markdown: markdown.to_string(),
            preferences: preferences.clone(),
        };

        match self.post_text("/generate", &body).await {
            Ok(text) => TextOutcome { text, error: None },
            Err(e) => {
                tracing::warn!(error = %e, "generate request failed");
                TextOutcome {
                    text: markdown.to_string(),
                    error: Some(e.to_string()),
                }
            }
        }
    }

    /// `POST /personalize` - fetch a structured recommendation.
    ///
    /// Unlike the other calls this one propagates failure, including a body
    /// whose status is `error`, so the caller can decide to stop offering
    /// auto-personalization.
    pub async fn fetch_personalization(
        &self,
        tags: &BTreeSet<String>,
        free_text: &str,
    ) -> Result<PersonalizationResponse, ClientError> {
        let request =
            recommendation::personalization_request(tags.iter().map(String::as_str), free_text);

        let response = self
            .http
            .post(format!("{}/personalize", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| ClientError::Connection {
                base_url: self.base_url.clone(),
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(ClientError::Status {
                code: response.status().as_u16(),
            });
        }

        let data: PersonalizationResponse =
            response.json().await.map_err(|e| ClientError::Malformed {
                message: e.to_string(),
            })?;

        if data.status == Status::Error {
            return Err(ClientError::ErrorStatus);
        }

        Ok(data)
    }

    async fn post_text<B: Serialize>(&self, path: &str, body: &B) -> Result<String, ClientError> {
        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await
            .map_err(|e| ClientError::Connection {
                base_url: self.base_url.clone(),
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(ClientError::Status {
                code: response.status().as_u16(),
            });
        }

        let body: TextResponse = response.json().await.map_err(|e| ClientError::Malformed {
            message: e.to_string(),
        })?;

        Ok(body.text)
    }
}
