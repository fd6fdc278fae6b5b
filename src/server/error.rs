//! API error types and response formatting.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

/// API error type that converts to JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Generation failed at the provider gateway.
    #[error("{0}")]
    Generation(String),
}

/// JSON error response body, `{"error": "..."}` on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Generation(message) => {
                tracing::error!(error = %message, "generation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody { error: message }),
                )
                    .into_response()
            }
        }
    }
}
