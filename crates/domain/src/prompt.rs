//! Prompt request — the immutable root of one pipeline run.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::persona::Persona;

/// Accepted study prompt. Uniquely identifies a pipeline instance; the id is
/// assigned at ingestion and never changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptRequest {
    pub prompt_id: Uuid,
    pub course_id: String,
    pub prompt: String,
    pub user_persona: Persona,
}

/// Unit of work in the slide worker queue: one slide's narration, ready for
/// audio and video rendering. `slide_index` is 1-based to match the on-disk
/// `<i>.wav` / `<i>.mp4` naming.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideTask {
    pub prompt_id: Uuid,
    pub slide_index: u32,
    pub narration_text: String,
    pub persona: Persona,
    pub course_id: String,
}
