//! HTTP surfaces of the control plane.
//!
//! Three public surfaces share one router and one `AppState`:
//! - prompt ingestion (`/core/prompt`),
//! - the slide sub-pipeline (`/v1/slides/...`),
//! - the status fabric (`/status/...`, including the live WebSocket),
//! plus the video status and health probes.

pub mod health;
pub mod prompt;
pub mod slides;
pub mod status;
pub mod video;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use orpheus_domain::Error;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the full API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        // Health probe
        .route("/v1/health", get(health::health))
        // Prompt ingestion
        .route("/core/prompt", post(prompt::create_lecture))
        // Slides surface
        .route("/v1/slides/generate", post(slides::generate))
        .route("/v1/slides/:prompt_id/status", get(slides::generation_status))
        // Status fabric
        .route("/status/:prompt_id", get(status::get_status))
        .route("/status/:prompt_id/update", patch(status::update_status))
        .route("/status/:prompt_id/live", get(status::live))
        // Video surface
        .route("/v1/video/:prompt_id/status", get(video::generation_status))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Build a standardized JSON error response: `{ "error": "<message>" }`.
pub(crate) fn api_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "error": message.into() }))).into_response()
}

/// Translate domain error kinds into HTTP status codes.
pub(crate) fn error_response(err: &Error) -> Response {
    let status = match err {
        Error::BadRequest(_) => StatusCode::BAD_REQUEST,
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::Collaborator { .. } => StatusCode::BAD_GATEWAY,
        Error::MalformedLlmOutput(_) => StatusCode::BAD_GATEWAY,
        Error::ShuttingDown => StatusCode::SERVICE_UNAVAILABLE,
        Error::Filesystem(_) | Error::Json(_) | Error::Config(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    api_error(status, err.to_string())
}
