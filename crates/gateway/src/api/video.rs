//! Video status surface.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::api_error;
use crate::runtime::video_jobs::VideoJobState;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VideoStatusResponse {
    prompt_id: Uuid,
    status: VideoJobState,
    last_updated: DateTime<Utc>,
    /// Public folder where finished `{i}.mp4` files appear.
    result_url: String,
    estimated_seconds_left: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<VideoError>,
}

#[derive(Debug, Serialize)]
struct VideoError {
    code: &'static str,
    message: String,
}

/// `GET /v1/video/{promptId}/status` — `404` until the first narration task
/// for the prompt has been enqueued.
pub async fn generation_status(
    State(state): State<AppState>,
    Path(prompt_id): Path<Uuid>,
) -> Response {
    let Some(job) = state.video_jobs.get(prompt_id) else {
        return api_error(StatusCode::NOT_FOUND, "request not found");
    };

    let error = match job.state {
        VideoJobState::Failed => Some(VideoError {
            code: "GENERATION_FAILED",
            message: "avatar video generation failed".to_owned(),
        }),
        _ if job.failed_slides > 0 => Some(VideoError {
            code: "PARTIAL_RESULT",
            message: format!("{} slide(s) failed to render", job.failed_slides),
        }),
        _ => None,
    };

    Json(VideoStatusResponse {
        prompt_id,
        status: job.state,
        last_updated: job.last_updated,
        result_url: job.result_url.clone(),
        estimated_seconds_left: job.eta_seconds(Utc::now()),
        error,
    })
    .into_response()
}
