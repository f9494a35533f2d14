//! Phases 4-6: slide structure, per-slide materialization fan-out, and deck
//! post-processing.
//!
//! Shared between the prompt pipeline and the standalone slides surface:
//! both compute the structure in-line (so callers get it immediately) and
//! run the fan-out plus upload in the background, tracked by the job
//! manager. When `SLIDES_API_URL` points at an external slides service the
//! whole sub-pipeline is delegated over HTTP instead.

use orpheus_clients::postprocessing::{SlidesetAsset, SlidesetWithId, StoreSlidesetRequest};
use orpheus_domain::slides::{SlideGenerationRequest, SlideStructure};
use orpheus_domain::status::{StatusPatch, StepStatus};
use orpheus_domain::Result;

use super::{materialize, structure};
use crate::state::AppState;

/// Run phase 4 inline and spawn phases 5-6; returns the structure as soon as
/// it is known. The structure patch also creates the avatar progress slots.
pub async fn generate(
    state: &AppState,
    request: &SlideGenerationRequest,
) -> Result<SlideStructure> {
    let prompt_id = request.prompt_id;

    if let Some(remote) = &state.slides_remote {
        // Split deployment: the remote service owns job tracking and
        // post-processing; only the structure flows back into our status.
        let accepted = remote.generate(request).await.inspect_err(|_| {
            state.status.update(
                prompt_id,
                &StatusPatch {
                    step_slide_structure_generation: Some(StepStatus::Failed),
                    ..StatusPatch::default()
                },
            );
        })?;
        state.status.update(
            prompt_id,
            &StatusPatch {
                step_slide_structure_generation: Some(StepStatus::Done),
                slide_structure: Some(accepted.structure.clone()),
                ..StatusPatch::default()
            },
        );
        return Ok(accepted.structure);
    }

    // ── 4. Structure ─────────────────────────────────────────────────
    state.status.update(
        prompt_id,
        &StatusPatch {
            step_slide_structure_generation: Some(StepStatus::InProgress),
            ..StatusPatch::default()
        },
    );
    let slide_structure = match structure::generate(state, &request.lecture_script).await {
        Ok(s) => s,
        Err(err) => {
            state.status.update(
                prompt_id,
                &StatusPatch {
                    step_slide_structure_generation: Some(StepStatus::Failed),
                    ..StatusPatch::default()
                },
            );
            return Err(err);
        }
    };
    state.status.update(
        prompt_id,
        &StatusPatch {
            step_slide_structure_generation: Some(StepStatus::Done),
            slide_structure: Some(slide_structure.clone()),
            ..StatusPatch::default()
        },
    );

    // ── 5-6. Fan-out + upload, off the caller's path ─────────────────
    state.jobs.init(prompt_id, slide_structure.len() as u32);
    tokio::spawn(materialize_and_publish(
        state.clone(),
        request.clone(),
        slide_structure.clone(),
    ));

    Ok(slide_structure)
}

/// Phase 5 fan-out and phase 6 upload. Materialization tasks run in
/// parallel; completion order is unspecified, assembly restores draft order.
/// A failed slide marks the job errored but still ships an empty body so the
/// partial deck reaches the post-processor.
async fn materialize_and_publish(
    state: AppState,
    request: SlideGenerationRequest,
    slide_structure: SlideStructure,
) {
    let prompt_id = request.prompt_id;

    let mut tasks = Vec::with_capacity(slide_structure.len());
    for draft in slide_structure.pages.clone() {
        let state = state.clone();
        tasks.push(tokio::spawn(async move {
            let index = draft.index;
            match materialize::materialize_slide(&state, &draft).await {
                Ok(body) => {
                    let achieved = state.jobs.finish_page(prompt_id);
                    state.status.update(
                        prompt_id,
                        &StatusPatch {
                            step_slide_generation: Some(achieved),
                            ..StatusPatch::default()
                        },
                    );
                    (index, body)
                }
                Err(err) => {
                    tracing::error!(%prompt_id, index, %err, "slide materialization failed");
                    state.jobs.fail(prompt_id);
                    (index, String::new())
                }
            }
        }));
    }

    let mut bodies = Vec::with_capacity(tasks.len());
    for task in tasks {
        match task.await {
            Ok(pair) => bodies.push(pair),
            Err(err) => {
                tracing::error!(%prompt_id, %err, "materialization task panicked");
                state.jobs.fail(prompt_id);
            }
        }
    }
    bodies.sort_by_key(|(index, _)| *index);

    let deck = bodies
        .iter()
        .map(|(_, body)| body.trim_end())
        .filter(|body| !body.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");

    // ── 6. Post-processing ───────────────────────────────────────────
    state.status.update(
        prompt_id,
        &StatusPatch {
            step_slide_postprocessing: Some(StepStatus::InProgress),
            ..StatusPatch::default()
        },
    );
    let upload = StoreSlidesetRequest {
        theme: state.config.slides_theme.clone(),
        slideset: SlidesetWithId {
            prompt_id,
            slideset: deck,
            assets: request
                .assets
                .iter()
                .map(|asset| SlidesetAsset {
                    path: asset.name.clone(),
                    data: asset.data.clone(),
                })
                .collect(),
        },
    };
    match state.publisher.store_slideset(&upload).await {
        Ok(urls) => {
            tracing::info!(%prompt_id, web_url = %urls.web_url, "slideset published");
            state
                .jobs
                .finish_upload(prompt_id, Some(urls.web_url), Some(urls.pdf_url));
            state.status.update(
                prompt_id,
                &StatusPatch {
                    step_slide_postprocessing: Some(StepStatus::Done),
                    ..StatusPatch::default()
                },
            );
        }
        Err(err) => {
            tracing::error!(%prompt_id, %err, "slideset upload failed");
            state.jobs.fail(prompt_id);
            state.status.update(
                prompt_id,
                &StatusPatch {
                    step_slide_postprocessing: Some(StepStatus::Failed),
                    ..StatusPatch::default()
                },
            );
        }
    }
}
