//! Personalization HTTP service
//!
//! Stateless axum handlers for the three personalization operations plus a
//! health probe. Handler failures become JSON error payloads with non-2xx
//! status; nothing is persisted server-side.

mod describe;
mod error;
mod generate;
mod health;
mod personalize;
mod state;

pub use describe::{DescribeRequest, TextResponse};
pub use error::{ApiError, ErrorBody};
pub use generate::GenerateRequest;
pub use state::AppState;

use axum::routing::{get, post};
use axum::Router;

/// Build the complete service router.
///
/// - `POST /describe` - 2-4 word reader description
/// - `POST /generate` - Markdown rewrite (structured or legacy payload)
/// - `POST /personalize` - structured recommendation
/// - `GET /health` - health check
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/describe", post(describe::describe))
        .route("/generate", post(generate::generate))
        .route("/personalize", post(personalize::personalize))
        .with_state(state)
}
