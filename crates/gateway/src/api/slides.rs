//! Slides surface — the slide sub-pipeline for callers that already hold a
//! lecture script, and its status endpoint.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use orpheus_domain::slides::{
    GenerationAcceptedResponse, GenerationStatusResponse, SlideGenerationRequest,
};
use uuid::Uuid;

use super::{api_error, error_response};
use crate::pipeline::slides;
use crate::state::AppState;

/// `POST /v1/slides/generate` — phase 4 runs in-line so the structure is in
/// the `202` body; materialization and upload continue in background.
pub async fn generate(State(state): State<AppState>, body: Bytes) -> Response {
    let request: SlideGenerationRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(err) => return api_error(StatusCode::BAD_REQUEST, format!("invalid body: {err}")),
    };
    if request.course_id.trim().is_empty() {
        return api_error(StatusCode::BAD_REQUEST, "courseId must not be empty");
    }
    if request.lecture_script.trim().is_empty() {
        return api_error(StatusCode::BAD_REQUEST, "lectureScript must not be empty");
    }

    let structure = match slides::generate(&state, &request).await {
        Ok(s) => s,
        Err(err) => return error_response(&err),
    };

    let status = if structure.is_empty() {
        "DONE"
    } else {
        "IN_PROGRESS"
    };
    (
        StatusCode::ACCEPTED,
        Json(GenerationAcceptedResponse {
            prompt_id: request.prompt_id,
            status: status.to_owned(),
            created_at: Utc::now(),
            structure,
        }),
    )
        .into_response()
}

/// `GET /v1/slides/{promptId}/status` — the job manager answers first; for
/// prompts it no longer remembers, a persisted slideset at the
/// post-processor still counts as DONE.
pub async fn generation_status(
    State(state): State<AppState>,
    Path(prompt_id): Path<Uuid>,
) -> Response {
    if let Some(job) = state.jobs.get_status(prompt_id) {
        return Json(GenerationStatusResponse {
            prompt_id,
            status: job.derived_status().to_owned(),
            total_pages: job.total,
            generated_pages: job.achieved,
            last_updated: job.last_updated,
            web_url: job.web_url,
            pdf_url: job.pdf_url,
        })
        .into_response();
    }

    // Split deployment: generation was delegated, so progress lives in the
    // remote slides service, not our job manager.
    if let Some(remote) = &state.slides_remote {
        return match remote.status(prompt_id).await {
            Ok(Some(status)) => Json(status).into_response(),
            Ok(None) => api_error(StatusCode::NOT_FOUND, "slideset not found"),
            Err(err) => {
                tracing::warn!(%prompt_id, %err, "remote slides status lookup failed");
                error_response(&err)
            }
        };
    }

    match state.publisher.get_slideset(prompt_id).await {
        Ok(Some(stored)) => Json(GenerationStatusResponse {
            prompt_id,
            status: "DONE".to_owned(),
            total_pages: 0,
            generated_pages: 0,
            last_updated: Utc::now(),
            web_url: Some(stored.web_url),
            pdf_url: Some(stored.pdf_url),
        })
        .into_response(),
        Ok(None) => api_error(StatusCode::NOT_FOUND, "slideset not found"),
        Err(err) => {
            tracing::warn!(%prompt_id, %err, "post-processor lookup failed");
            error_response(&err)
        }
    }
}
