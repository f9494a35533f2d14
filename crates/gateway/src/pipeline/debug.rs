//! In-source mock collaborators for `ORPHEUS_DEBUG` runs.
//!
//! With the debug flag set, the composition root swaps every collaborator
//! seam for these mocks so the whole pipeline (prompt → status fabric →
//! worker → workspace files) can be smoke-tested on a laptop with no GPU
//! cluster, vector store, or renderer anywhere in sight.

use std::path::Path;

use orpheus_clients::postprocessing::{PublishedUrls, StoreSlidesetRequest, StoredSlideset};
use orpheus_clients::{ContextRetriever, MediaRenderer, SlidePublisher};
use orpheus_domain::retrieval::{DocumentChunk, RetrievedImage};
use orpheus_domain::Result;
use orpheus_providers::ChatModel;
use uuid::Uuid;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Chat model
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Answers every pipeline stage with a canned payload, keyed off marker
/// phrases the real prompts contain.
#[derive(Debug, Default)]
pub struct MockChatModel;

#[async_trait::async_trait]
impl ChatModel for MockChatModel {
    async fn complete(&self, _model: &str, prompt: &str) -> Result<String> {
        if prompt.starts_with("Decompose the following study question") {
            return Ok(r#"```json
{"original_question": "Explain for-loops", "subqueries": ["what is a for loop", "for loop syntax and examples"]}
```"#
                .to_owned());
        }
        if prompt.contains("split this into logical chunks") {
            return Ok(serde_json::json!({
                "items": [
                    {
                        "content": "Title: What is a for-loop?\n- A loop runs a block once per element\n- The loop variable takes each value in turn",
                        "layout": "default"
                    },
                    {
                        "content": "Title: Wrapping up\nFor-loops turn repetition into a single readable block.",
                        "layout": "end"
                    }
                ]
            })
            .to_string());
        }
        if prompt.contains("populate a slide template") {
            return Ok(serde_json::json!({
                "headline": "For-loops",
                "content": "- repeat a block once per element\n- the loop variable advances every pass",
                "message": "Thanks for listening!"
            })
            .to_string());
        }
        if prompt.starts_with("Summarize the following course material") {
            return Ok("This lecture introduces for-loops. It explains how a loop \
                       variable walks a sequence and why loops remove duplicated \
                       code. Examples cover counting and iterating collections."
                .to_owned());
        }
        if prompt.contains("recording the narration") {
            return Ok("Welcome! On this slide we look at how a for-loop repeats a \
                       block of code once for every element of a sequence."
                .to_owned());
        }
        // Script generation is the remaining JSON stage.
        Ok(serde_json::json!({
            "text": "Today we will learn about for-loops. A for-loop repeats a block of code once per element of a sequence. The loop variable takes each value in turn, which removes duplicated code and makes intent obvious.",
            "assets": []
        })
        .to_string())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Retrieval
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Default)]
pub struct MockRetriever;

#[async_trait::async_trait]
impl ContextRetriever for MockRetriever {
    async fn retrieve(&self, _course_id: &str, query: &str) -> Result<DocumentChunk> {
        Ok(DocumentChunk {
            content: vec![
                format!("Demo course material matching '{query}'."),
                "A for-loop executes its body once per element of a sequence; \
                 the loop variable is bound to each element in turn."
                    .to_owned(),
            ],
            images: vec![RetrievedImage {
                image_base64: "aVZCT1J3MEtHZ28=".to_owned(),
                description: "Flow chart of a for-loop".to_owned(),
            }],
            score: 0.87,
        })
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Media renderer
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Writes tiny stub payloads where the real WAV/MP4 bytes would land, so the
/// workspace layout and atomic-rename discipline are exercised end to end.
#[derive(Debug, Default)]
pub struct MockMediaRenderer;

#[async_trait::async_trait]
impl MediaRenderer for MockMediaRenderer {
    async fn render_audio(
        &self,
        _narration: &str,
        _voice_sample: &Path,
        dest: &Path,
    ) -> Result<u64> {
        let stub = b"RIFF\0\0\0\0WAVEdebug";
        tokio::fs::write(dest, stub).await?;
        Ok(stub.len() as u64)
    }

    async fn render_video(&self, _audio: &Path, _source_image: &Path, dest: &Path) -> Result<u64> {
        let stub = b"\0\0\0\x18ftypmp42debug";
        tokio::fs::write(dest, stub).await?;
        Ok(stub.len() as u64)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Post-processor
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Default)]
pub struct MockSlidePublisher;

#[async_trait::async_trait]
impl SlidePublisher for MockSlidePublisher {
    async fn store_slideset(&self, request: &StoreSlidesetRequest) -> Result<PublishedUrls> {
        let prompt_id = request.slideset.prompt_id;
        Ok(PublishedUrls {
            web_url: format!("https://slides.local/{prompt_id}/"),
            pdf_url: format!("https://slides.local/{prompt_id}/deck.pdf"),
        })
    }

    async fn get_slideset(&self, _prompt_id: Uuid) -> Result<Option<StoredSlideset>> {
        Ok(None)
    }
}
