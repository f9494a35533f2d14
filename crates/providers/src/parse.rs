//! Lenient JSON recovery for LLM replies.
//!
//! Models asked for "JSON only" still wrap objects in ```json fences or
//! surround them with prose. Recovery is two explicit steps, each its own
//! function so they can be tested in isolation:
//!
//! 1. [`strip_code_fences`] removes a leading/trailing fence pair;
//! 2. strict parse, and on failure [`scan_braced_object`] extracts the first
//!    balanced `{...}` substring for one retry.

use orpheus_domain::{Error, Result};
use serde::de::DeserializeOwned;

/// Remove a surrounding Markdown code fence, if any. Handles ```json, bare
/// ``` fences, and replies that only open a fence without closing it.
pub fn strip_code_fences(raw: &str) -> &str {
    let mut s = raw.trim();
    for opener in ["```json", "```JSON", "```"] {
        if let Some(rest) = s.strip_prefix(opener) {
            s = rest;
            break;
        }
    }
    if let Some(rest) = s.strip_suffix("```") {
        s = rest;
    }
    s.trim()
}

/// Find the first balanced top-level `{...}` substring, honoring string
/// literals and escapes so braces inside values do not end the scan.
pub fn scan_braced_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let bytes = raw.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &b) in bytes[start..].iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match b {
            b'\\' if in_string => escaped = true,
            b'"' => in_string = !in_string,
            b'{' if !in_string => depth += 1,
            b'}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&raw[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse an LLM reply into `T`: fence stripping, then strict JSON, then one
/// brace-scan recovery. The returned error carries a bounded excerpt of the
/// raw reply for the logs.
pub fn parse_json_lenient<T: DeserializeOwned>(raw: &str) -> Result<T> {
    let stripped = strip_code_fences(raw);

    match serde_json::from_str::<T>(stripped) {
        Ok(value) => Ok(value),
        Err(first_err) => {
            if let Some(candidate) = scan_braced_object(stripped) {
                if let Ok(value) = serde_json::from_str::<T>(candidate) {
                    return Ok(value);
                }
            }
            Err(Error::MalformedLlmOutput(format!(
                "{first_err}; raw output: {}",
                excerpt(raw, 200)
            )))
        }
    }
}

fn excerpt(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_owned();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Decomposition {
        original_question: String,
        subqueries: Vec<String>,
    }

    const RAW: &str = r#"{"original_question":"X","subqueries":["a","b"]}"#;

    #[test]
    fn raw_json_passes_through() {
        let d: Decomposition = parse_json_lenient(RAW).unwrap();
        assert_eq!(d.subqueries, vec!["a", "b"]);
    }

    #[test]
    fn json_fence_is_stripped() {
        let fenced = format!("```json\n{RAW}\n```");
        let d: Decomposition = parse_json_lenient(&fenced).unwrap();
        assert_eq!(d.original_question, "X");
    }

    #[test]
    fn bare_fence_is_stripped() {
        let fenced = format!("```\n{RAW}\n```");
        let d: Decomposition = parse_json_lenient(&fenced).unwrap();
        assert_eq!(d.original_question, "X");
    }

    #[test]
    fn unclosed_fence_is_stripped() {
        let fenced = format!("```json\n{RAW}");
        let d: Decomposition = parse_json_lenient(&fenced).unwrap();
        assert_eq!(d.subqueries.len(), 2);
    }

    #[test]
    fn object_embedded_in_prose_is_recovered() {
        let prose = format!("Sure! Here is the decomposition you asked for:\n{RAW}\nHope it helps.");
        let d: Decomposition = parse_json_lenient(&prose).unwrap();
        assert_eq!(d.original_question, "X");
    }

    #[test]
    fn fenced_equals_raw() {
        // The recovered object must be identical to a raw emission.
        let fenced = format!("```json\n{RAW}\n```");
        let a: Decomposition = parse_json_lenient(RAW).unwrap();
        let b: Decomposition = parse_json_lenient(&fenced).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn braces_inside_strings_do_not_confuse_the_scan() {
        let tricky = r#"noise {"original_question":"what is {x}?","subqueries":["a\"b}"]} trailing"#;
        let d: Decomposition = parse_json_lenient(tricky).unwrap();
        assert_eq!(d.original_question, "what is {x}?");
        assert_eq!(d.subqueries[0], "a\"b}");
    }

    #[test]
    fn scan_finds_first_balanced_object() {
        let s = "a {\"k\": {\"nested\": 1}} b {\"second\": 2}";
        assert_eq!(scan_braced_object(s), Some("{\"k\": {\"nested\": 1}}"));
    }

    #[test]
    fn hopeless_output_reports_malformed() {
        let err = parse_json_lenient::<Decomposition>("I cannot answer that.").unwrap_err();
        assert!(matches!(
            err,
            orpheus_domain::Error::MalformedLlmOutput(_)
        ));
    }

    #[test]
    fn error_excerpt_is_bounded() {
        let long = "x".repeat(10_000);
        let err = parse_json_lenient::<Decomposition>(&long).unwrap_err();
        let msg = err.to_string();
        assert!(msg.len() < 400);
    }
}
