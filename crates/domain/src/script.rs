//! Lecture script — the single coherent narrative produced once per prompt.

use serde::{Deserialize, Serialize};

/// Asset referenced by the script, shipped to the slide post-processor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LectureAsset {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub mime_type: String,
    /// Base64-encoded payload.
    #[serde(default)]
    pub data: String,
}

/// Produced by the script phase; input to slide structuring and narration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LectureScript {
    pub text: String,
    #[serde(default)]
    pub assets: Vec<LectureAsset>,
}
