//! Phase 2: retrieve context for every sub-query, plus the out-of-band
//! lecture summary.

use orpheus_domain::retrieval::DocumentChunk;
use orpheus_domain::status::StatusPatch;
use uuid::Uuid;

use crate::state::AppState;

/// Query the retrieval collaborator once per sub-query, in order. A failed
/// sub-query is logged and skipped; the lookup phase itself never fails, so
/// an empty result set still lets the script phase run on empty context.
pub async fn retrieve_context(
    state: &AppState,
    subqueries: &[String],
    course_id: &str,
) -> Vec<DocumentChunk> {
    let mut chunks = Vec::new();
    for subquery in subqueries {
        match state.retriever.retrieve(course_id, subquery).await {
            Ok(chunk) => {
                tracing::debug!(course_id, subquery, score = chunk.score, "context retrieved");
                chunks.push(chunk);
            }
            Err(err) => {
                tracing::warn!(course_id, subquery, %err, "retrieval failed, continuing with partial context");
            }
        }
    }
    chunks
}

fn summary_prompt(text: &str) -> String {
    format!(
        "Summarize the following course material in 3-4 sentences. \
         Write plain prose, no lists, no preamble.\n\n{text}"
    )
}

/// Fire-and-forget: ask for a short summary of the aggregated context and
/// patch `lectureSummary` when it arrives. Nothing joins on this task.
pub fn spawn_summary(state: AppState, prompt_id: Uuid, chunks: &[DocumentChunk]) {
    let text = DocumentChunk::joined_text(chunks);
    if text.trim().is_empty() {
        return;
    }
    tokio::spawn(async move {
        let model = state.config.llm.slidesgen_model.clone();
        match state.llm.complete(&model, &summary_prompt(&text)).await {
            Ok(summary) => {
                state.status.update(
                    prompt_id,
                    &StatusPatch {
                        lecture_summary: Some(summary.trim().to_owned()),
                        ..StatusPatch::default()
                    },
                );
            }
            Err(err) => {
                tracing::warn!(%prompt_id, %err, "lecture summary generation failed");
            }
        }
    });
}
