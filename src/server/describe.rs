//! `POST /describe` - derive a short reader description.

use std::collections::BTreeSet;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use super::state::AppState;
use crate::prompt;

/// Request body for `/describe`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescribeRequest {
    #[serde(default, rename = "selectedOptions")]
    pub selected_options: BTreeSet<String>,

    #[serde(default, rename = "customPrompt")]
    pub custom_prompt: String,
}

/// Response body shared by the describe and generate endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextResponse {
    pub text: String,
}

pub async fn describe(
    State(state): State<AppState>,
    Json(request): Json<DescribeRequest>,
) -> Result<Json<TextResponse>, ApiError> {
    let prompt = prompt::build_describe_prompt(&request.selected_options, &request.custom_prompt);
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
