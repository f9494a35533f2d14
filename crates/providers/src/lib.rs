//! LLM provider client for the Orpheus control plane.
//!
//! One adapter (OpenAI-compatible chat completions) behind the [`ChatModel`]
//! trait, plus the lenient JSON recovery parser every reasoning stage relies
//! on. The control plane requires JSON-only replies for decomposition,
//! script, slide structure, and field-schema filling; models wrap them in
//! code fences or prose often enough that recovery lives here, next to the
//! client, as plain testable functions.

pub mod client;
pub mod parse;

pub use client::{ChatModel, HttpChatModel};
pub use parse::parse_json_lenient;
