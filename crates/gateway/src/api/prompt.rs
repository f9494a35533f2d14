//! Prompt ingestion.
//!
//! `POST /core/prompt` — accept a study prompt, assign it a prompt id, and
//! hand the pipeline run to the shared task pool. The response never waits
//! for any pipeline work.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use orpheus_domain::persona::Persona;
use orpheus_domain::prompt::PromptRequest;
use serde::{Deserialize, Serialize};
use tracing::Instrument;
use uuid::Uuid;

use super::api_error;
use crate::pipeline;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptBody {
    pub prompt: String,
    pub course_id: String,
    pub user_persona: Persona,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PromptResponse {
    prompt_id: Uuid,
}

pub async fn create_lecture(State(state): State<AppState>, body: Bytes) -> Response {
    let body: PromptBody = match serde_json::from_slice(&body) {
        Ok(b) => b,
        Err(err) => return api_error(StatusCode::BAD_REQUEST, format!("invalid body: {err}")),
    };
    if body.prompt.trim().is_empty() {
        return api_error(StatusCode::BAD_REQUEST, "prompt must not be empty");
    }
    if body.course_id.trim().is_empty() {
        return api_error(StatusCode::BAD_REQUEST, "courseId must not be empty");
    }

    let prompt_id = Uuid::new_v4();
    let request = PromptRequest {
        prompt_id,
        course_id: body.course_id,
        prompt: body.prompt,
        user_persona: body.user_persona,
    };

    let span = tracing::info_span!("prompt_pipeline", %prompt_id);
    tokio::spawn(pipeline::process_prompt(state, request).instrument(span));

    (StatusCode::ACCEPTED, Json(PromptResponse { prompt_id })).into_response()
}
