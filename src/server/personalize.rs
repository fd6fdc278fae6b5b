//! `POST /personalize` - structured personalization recommendation.
//!
//! Asks the provider for JSON matching the canonical recommendation schema.
//! Output that fails to parse is replaced by the deterministic fallback
//! object with a 500 status; the parse failure itself never escapes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::state::AppState;
use crate::prompt;
use crate::recommendation::{self, PersonalizationRequest};

pub async fn personalize(
    State(state): State<AppState>,
    Json(request): Json<PersonalizationRequest>,
) -> Response {
    let prompt = prompt::build_recommend_prompt(&request);
    let response = state.gateway.generate(&prompt.text, prompt.max_tokens).await;

    if let Some(error) = &response.error {
        tracing::warn!(error = %error, "recommendation generation failed");
    }

    match recommendation::parse_response(&response.text) {
        Some(parsed) => Json(parsed).into_response(),
        None => {
            tracing::error!(provider = ?response.provider, "failed to parse recommendation");
            let fallback = recommendation::fallback_response(&request);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(fallback)).into_response()
        }
    }
}
