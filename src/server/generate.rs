//! `POST /generate` - rewrite Markdown for the reader's preferences.
//!
//! Accepts both the current payload (full preference set) and the legacy
//! flat payload (tags + free text).

use std::collections::BTreeSet;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::describe::TextResponse;
use super::error::ApiError;
use super::state::AppState;
use crate::preferences::PreferenceSet;
use crate::prompt::{self, Prompt};

/// Request body for `/generate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GenerateRequest {
    /// Full preference set, the current payload shape.
    Structured {
        markdown: String,
        preferences: PreferenceSet,
    },

    /// Flat tags + free text, the pre-structured payload shape.
    Legacy {
        markdown: String,
        #[serde(default, rename = "selectedOptions")]
        selected_options: BTreeSet<String>,
        #[serde(default, rename = "customPrompt")]
        custom_prompt: String,
    },
}

impl GenerateRequest {
    fn prompt(&self) -> Prompt {
        match self {
            GenerateRequest::Structured {
                markdown,
                preferences,
            } => prompt::build_rewrite_prompt(markdown, preferences),
            GenerateRequest::Legacy {
                markdown,
                selected_options,
                custom_prompt,
            } => prompt::build_legacy_rewrite_prompt(markdown, selected_options, custom_prompt),
        }
    }
}

pub async fn generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<TextResponse>, ApiError> {
    let prompt = request.prompt();
    let response = state.gateway.generate(&prompt.text, prompt.max_tokens).await;

    if response.is_error() {
        return Err(ApiError::Generation(
            response
                .error
                .unwrap_or_else(|| "Empty response from provider".to_string()),
        ));
    }

    Ok(Json(TextResponse {
        text: response.text,
    }))
}
