//! Phase 3: synthesize the lecture script from retrieved context, adapted to
//! the requesting persona.

use orpheus_domain::prompt::PromptRequest;
use orpheus_domain::retrieval::DocumentChunk;
use orpheus_domain::script::{LectureAsset, LectureScript};
use orpheus_domain::Result;
use serde::Deserialize;

use super::complete_json;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct ScriptReply {
    #[serde(alias = "lectureScript")]
    text: String,
    #[serde(default)]
    assets: Vec<AssetRef>,
}

/// The model references images by filename only; payloads are attached from
/// the retrieval results afterwards.
#[derive(Debug, Deserialize)]
struct AssetRef {
    name: String,
    #[serde(default)]
    description: String,
}

fn script_prompt(request: &PromptRequest, chunks: &[DocumentChunk]) -> String {
    let context = serde_json::to_string(chunks).unwrap_or_default();
    let image_names: Vec<String> = chunks
        .iter()
        .flat_map(|c| c.images.iter())
        .enumerate()
        .map(|(i, img)| format!("image-{}.png: {}", i + 1, img.description))
        .collect();

    format!(
        "You are preparing a university lecture. Write one single coherent \
         lecture script answering the student's question from the provided \
         course material.\n\
         \n\
         Student question: {question}\n\
         Student persona: {persona}\n\
         \n\
         Adapt tone, depth, and length to the persona. Use only the provided \
         material; do not invent facts.\n\
         \n\
         Available images (reference by filename only):\n{images}\n\
         \n\
         Course material (JSON):\n{context}\n\
         \n\
         Return JSON ONLY, with exactly this shape:\n\
         {{\"text\": \"the full lecture script\", \
         \"assets\": [{{\"name\": \"image-1.png\", \"description\": \"...\"}}]}}",
        question = request.prompt,
        persona = request.user_persona.prompt_summary(),
        images = if image_names.is_empty() {
            "(none)".to_owned()
        } else {
            image_names.join("\n")
        },
    )
}

/// Up to three attempts on malformed output, then the phase fails.
pub async fn generate(
    state: &AppState,
    request: &PromptRequest,
    chunks: &[DocumentChunk],
) -> Result<LectureScript> {
    let prompt = script_prompt(request, chunks);
    let reply: ScriptReply = complete_json(
        state.llm.as_ref(),
        &state.config.llm.slidesgen_model,
        &prompt,
        3,
    )
    .await?;

    // Attach retrieved image payloads positionally; a reference without a
    // matching image ships without data.
    let images: Vec<_> = chunks.iter().flat_map(|c| c.images.iter()).collect();
    let assets = reply
        .assets
        .into_iter()
        .enumerate()
        .map(|(i, asset)| LectureAsset {
            name: asset.name,
            description: asset.description,
            mime_type: "image/png".to_owned(),
            data: images
                .get(i)
                .map(|img| img.image_base64.clone())
                .unwrap_or_default(),
        })
        .collect();

    Ok(LectureScript {
        text: reply.text,
        assets,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use orpheus_domain::persona::{Language, Persona, Preferences, Role};
    use orpheus_domain::retrieval::RetrievedImage;
    use uuid::Uuid;

    fn request() -> PromptRequest {
        PromptRequest {
            prompt_id: Uuid::new_v4(),
            course_id: "cs001".into(),
            prompt: "Explain for-loops".into(),
            user_persona: Persona {
                language: Language::English,
                preferences: Preferences::default(),
                enrolled_courses: vec![],
                role: Role::Student,
            },
        }
    }

    #[test]
    fn prompt_lists_images_by_filename() {
        let chunks = vec![DocumentChunk {
            content: vec!["loops repeat".into()],
            images: vec![RetrievedImage {
                image_base64: "aGk=".into(),
                description: "loop diagram".into(),
            }],
            score: 0.9,
        }];
        let p = script_prompt(&request(), &chunks);
        assert!(p.contains("image-1.png: loop diagram"));
        assert!(p.contains("Explain for-loops"));
    }

    #[test]
    fn reply_accepts_legacy_field_name() {
        let reply: ScriptReply =
            serde_json::from_str(r#"{"lectureScript":"hello","assets":[]}"#).unwrap();
        assert_eq!(reply.text, "hello");
    }
}
