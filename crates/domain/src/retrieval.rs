//! Retrieval results from the document-intelligence service. Opaque to the
//! control plane: chunks are concatenated into LLM prompts, never inspected.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedImage {
    /// Base64-encoded image bytes. The retrieval endpoint calls this field
    /// `image`; the aggregated form uses `imageBase64`.
    #[serde(rename = "imageBase64", alias = "image")]
    pub image_base64: String,
    #[serde(default)]
    pub description: String,
}

/// One retrieval result item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentChunk {
    #[serde(default)]
    pub content: Vec<String>,
    #[serde(default)]
    pub images: Vec<RetrievedImage>,
    #[serde(default)]
    pub score: f32,
}

impl DocumentChunk {
    /// Flatten the text content of many chunks into one block, ordered as
    /// retrieved. Used for the lecture summary and as LLM context.
    pub fn joined_text(chunks: &[DocumentChunk]) -> String {
        chunks
            .iter()
            .flat_map(|c| c.content.iter())
            .cloned()
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_retrieval_wire_form() {
        let chunk: DocumentChunk = serde_json::from_str(
            r#"{"content":["a","b"],"images":[{"image":"aGk=","description":"diagram"}]}"#,
        )
        .unwrap();
        assert_eq!(chunk.content.len(), 2);
        assert_eq!(chunk.images[0].image_base64, "aGk=");
        assert_eq!(chunk.score, 0.0);
    }

    #[test]
    fn joined_text_preserves_order() {
        let chunks = vec![
            DocumentChunk {
                content: vec!["first".into()],
                ..Default::default()
            },
            DocumentChunk {
                content: vec!["second".into(), "third".into()],
                ..Default::default()
            },
        ];
        assert_eq!(DocumentChunk::joined_text(&chunks), "first\nsecond\nthird");
    }
}
