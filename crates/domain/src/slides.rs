//! Slide structure — the ordered decomposition of a lecture script into
//! per-slide drafts, prior to layout field-filling.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::persona::Persona;
use crate::script::LectureAsset;

/// One slide candidate: a self-contained Markdown chunk of the lecture
/// script tagged with a layout from the registered catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideDraft {
    /// 1-based position in the deck.
    pub index: u32,
    /// Self-contained Markdown; tables and code preserved verbatim.
    pub content: String,
    /// Layout name; unknown names are coerced to `default` at
    /// materialization time.
    pub layout_name: String,
}

/// Ordered sequence of drafts. The union of all `content` covers the lecture
/// script's ideas without cross-references.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideStructure {
    pub pages: Vec<SlideDraft>,
}

impl SlideStructure {
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Slides surface wire types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Body of `POST /v1/slides/generate` — for callers that already hold a
/// lecture script and only want the slide sub-pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideGenerationRequest {
    pub course_id: String,
    pub prompt_id: Uuid,
    pub lecture_script: String,
    pub user: Persona,
    #[serde(default)]
    pub assets: Vec<LectureAsset>,
}

/// `202` ack: the structure is computed in-line, fan-out runs in background.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationAcceptedResponse {
    pub prompt_id: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub structure: SlideStructure,
}

/// Reply of `GET /v1/slides/{promptId}/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationStatusResponse {
    pub prompt_id: Uuid,
    pub status: String,
    pub total_pages: u32,
    pub generated_pages: u32,
    pub last_updated: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,
}
