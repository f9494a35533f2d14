//! Phase 1: decompose the study prompt into retrieval-friendly sub-queries.

use orpheus_domain::Result;
use orpheus_providers::{parse_json_lenient, ChatModel};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Decomposition {
    pub original_question: String,
    #[serde(default)]
    pub subqueries: Vec<String>,
}

fn decompose_prompt(question: &str) -> String {
    format!(
        "Decompose the following study question into focused sub-queries \
         suitable for semantic search over course material.\n\
         \n\
         Rules:\n\
         - Emit between one and four sub-queries.\n\
         - Each sub-query must be self-contained and retrieval-friendly.\n\
         - Do not answer the question.\n\
         - Return JSON ONLY, with exactly this shape:\n\
         {{\"original_question\": \"...\", \"subqueries\": [\"...\"]}}\n\
         \n\
         Question to analyze: {question}",
        question = serde_json::to_string(question).unwrap_or_else(|_| question.to_owned())
    )
}

/// One model call; fence stripping and a single brace-scan retry happen in
/// the lenient parser. A reply that still does not parse fails the phase.
pub async fn decompose(
    llm: &dyn ChatModel,
    model: &str,
    question: &str,
) -> Result<Decomposition> {
    let raw = llm.complete(model, &decompose_prompt(question)).await?;
    parse_json_lenient(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_the_question_json_escaped() {
        let p = decompose_prompt("What is a \"for\" loop?");
        assert!(p.contains("\\\"for\\\""));
        assert!(p.contains("subqueries"));
    }

    #[test]
    fn fenced_reply_parses_like_raw() {
        let raw = r#"{"original_question":"X","subqueries":["a","b"]}"#;
        let fenced = format!("```json\n{raw}\n```");
        let d: Decomposition = parse_json_lenient(&fenced).unwrap();
        assert_eq!(d.original_question, "X");
        assert_eq!(d.subqueries, vec!["a", "b"]);
    }
}
