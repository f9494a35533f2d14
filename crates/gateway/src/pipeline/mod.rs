//! The prompt pipeline: end-to-end orchestration from study prompt to
//! per-slide talking-avatar videos.
//!
//! Phases 1-4 are sequential; phase 5 fans out per slide; narration (7) is
//! sequential again because every slide's narration feeds the next one's
//! prompt, but enqueuing is nonblocking so the worker starts rendering slide
//! 1 while slide 2's narration is still being generated. Every phase writes
//! its progress to the status fabric before and after doing work; a failed
//! load-bearing phase patches FAILED and aborts the run, keeping whatever
//! partial artifacts exist.

pub mod debug;
pub mod lookup;
pub mod materialize;
pub mod narration;
pub mod script;
pub mod slides;
pub mod structure;
pub mod understand;

use orpheus_domain::prompt::PromptRequest;
use orpheus_domain::slides::SlideGenerationRequest;
use orpheus_domain::status::{StatusPatch, StepStatus};
use orpheus_domain::{Error, Result};
use orpheus_providers::{parse_json_lenient, ChatModel};
use serde::de::DeserializeOwned;

use crate::state::AppState;

/// Ask the model for JSON and recover leniently, retrying the whole call on
/// malformed output. Collaborator failures are not retried.
pub(crate) async fn complete_json<T: DeserializeOwned>(
    llm: &dyn ChatModel,
    model: &str,
    prompt: &str,
    attempts: u32,
) -> Result<T> {
    let mut last_err = Error::MalformedLlmOutput("no attempts made".into());
    for attempt in 1..=attempts {
        let raw = llm.complete(model, prompt).await?;
        match parse_json_lenient::<T>(&raw) {
            Ok(value) => return Ok(value),
            Err(err) => {
                tracing::warn!(attempt, %err, "LLM returned malformed JSON");
                last_err = err;
            }
        }
    }
    Err(last_err)
}

/// Run the full pipeline for one accepted prompt. Spawned onto the shared
/// task pool by the prompt handler; never called on the response path.
pub async fn process_prompt(state: AppState, request: PromptRequest) {
    let prompt_id = request.prompt_id;
    tracing::info!(%prompt_id, course_id = %request.course_id, "prompt pipeline started");

    // ── 1. Understanding ─────────────────────────────────────────────
    state.status.update(
        prompt_id,
        &StatusPatch {
            step_understanding: Some(StepStatus::InProgress),
            ..StatusPatch::default()
        },
    );
    let decomposition = match understand::decompose(
        state.llm.as_ref(),
        &state.config.llm.splitting_model,
        &request.prompt,
    )
    .await
    {
        Ok(d) => d,
        Err(err) => {
            tracing::error!(%prompt_id, %err, "prompt decomposition failed");
            state.status.update(
                prompt_id,
                &StatusPatch {
                    step_understanding: Some(StepStatus::Failed),
                    ..StatusPatch::default()
                },
            );
            return;
        }
    };
    state.status.update(
        prompt_id,
        &StatusPatch {
            step_understanding: Some(StepStatus::Done),
            ..StatusPatch::default()
        },
    );

    // ── 2. Lookup ────────────────────────────────────────────────────
    state.status.update(
        prompt_id,
        &StatusPatch {
            step_lookup: Some(StepStatus::InProgress),
            ..StatusPatch::default()
        },
    );
    let chunks =
        lookup::retrieve_context(&state, &decomposition.subqueries, &request.course_id).await;
    // The summary runs out-of-band; the pipeline never waits for it.
    lookup::spawn_summary(state.clone(), prompt_id, &chunks);
    state.status.update(
        prompt_id,
        &StatusPatch {
            step_lookup: Some(StepStatus::Done),
            ..StatusPatch::default()
        },
    );

    // ── 3. Script ────────────────────────────────────────────────────
    state.status.update(
        prompt_id,
        &StatusPatch {
            step_lecture_script_generation: Some(StepStatus::InProgress),
            ..StatusPatch::default()
        },
    );
    let script = match script::generate(&state, &request, &chunks).await {
        Ok(s) => s,
        Err(err) => {
            tracing::error!(%prompt_id, %err, "lecture script generation failed");
            state.status.update(
                prompt_id,
                &StatusPatch {
                    step_lecture_script_generation: Some(StepStatus::Failed),
                    ..StatusPatch::default()
                },
            );
            return;
        }
    };
    state.status.update(
        prompt_id,
        &StatusPatch {
            step_lecture_script_generation: Some(StepStatus::Done),
            ..StatusPatch::default()
        },
    );

    // ── 4-6. Slide sub-pipeline ──────────────────────────────────────
    let slides_request = SlideGenerationRequest {
        course_id: request.course_id.clone(),
        prompt_id,
        lecture_script: script.text.clone(),
        user: request.user_persona.clone(),
        assets: script.assets.clone(),
    };
    let structure = match slides::generate(&state, &slides_request).await {
        Ok(s) => s,
        Err(err) => {
            tracing::error!(%prompt_id, %err, "slide generation failed");
            return;
        }
    };

    // ── 7. Narration ─────────────────────────────────────────────────
    narration::generate_and_enqueue(&state, &request, &script, &structure).await;

    tracing::info!(%prompt_id, slides = structure.len(), "prompt pipeline finished");
}
