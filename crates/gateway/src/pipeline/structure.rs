//! Phase 4: split the lecture script into ordered slide drafts, each tagged
//! with a layout from the registered catalog.

use orpheus_domain::slides::{SlideDraft, SlideStructure};
use orpheus_domain::Result;
use serde::Deserialize;

use super::complete_json;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct StructureReply {
    #[serde(default)]
    items: Vec<StructureItem>,
}

#[derive(Debug, Deserialize)]
struct StructureItem {
    content: String,
    #[serde(default)]
    layout: String,
}

fn structure_prompt(lecture_script: &str, layout_descriptions: &str) -> String {
    format!(
        "You are an expert academic slide designer. Your ONLY task is to \
         split a lecture script into logical, self-contained chunks. Each \
         chunk corresponds to one slide.\n\
         \n\
         RULES:\n\
         - Do NOT add, remove, or invent content.\n\
         - Preserve the original order of ideas.\n\
         - Each chunk should focus on one coherent idea or example.\n\
         - If the script contains a question and later its answer, make them two separate chunks.\n\
         - If the script contains lists, tables, or code, keep them intact in the same chunk.\n\
         - Each chunk must be standalone (avoid references to other slides).\n\
         - Begin each chunk with 'Title:' followed by the main idea.\n\
         - Assign the layout field with a valid name from the provided list \
         (use the most general layout if unsure).\n\
         Available layouts:\n{layout_descriptions}\n\
         \n\
         Lecture script:\n\n{lecture_script}\n\n\
         Now split this into logical chunks. Return JSON ONLY:\n\
         {{\"items\": [{{\"content\": \"...\", \"layout\": \"...\"}}]}}"
    )
}

/// Unknown or empty layout names are coerced to `default` here, so the rest
/// of the pipeline only ever sees registered names.
pub async fn generate(state: &AppState, lecture_script: &str) -> Result<SlideStructure> {
    let prompt = structure_prompt(lecture_script, &state.layouts.descriptions());
    let reply: StructureReply = complete_json(
        state.llm.as_ref(),
        &state.config.llm.splitting_model,
        &prompt,
        3,
    )
    .await?;

    let pages = reply
        .items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            let layout_name = if state.layouts.contains(item.layout.trim()) {
                item.layout.trim().to_owned()
            } else {
                if !item.layout.trim().is_empty() {
                    tracing::warn!(layout = %item.layout, "unknown layout, coercing to default");
                }
                "default".to_owned()
            };
            SlideDraft {
                index: (i + 1) as u32,
                content: item.content,
                layout_name,
            }
        })
        .collect();

    Ok(SlideStructure { pages })
}
