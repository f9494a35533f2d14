//! OpenAI-compatible chat completion client.
//!
//! Works against any endpoint following the chat completions contract
//! (Ollama, vLLM, OpenAI, Together). The control plane only ever needs the
//! text body of the first choice; tools and streaming are out of scope.

use std::time::Duration;

use orpheus_domain::config::LlmConfig;
use orpheus_domain::{Error, Result};
use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The reasoning seam of the pipeline. Implemented by [`HttpChatModel`] in
/// production and by canned mocks in tests and debug mode.
#[async_trait::async_trait]
pub trait ChatModel: Send + Sync {
    /// Send a single-turn prompt to the named model and return the text body.
    async fn complete(&self, model: &str, prompt: &str) -> Result<String>;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Wire types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    stream: bool,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// HTTP client
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Generation can take minutes on shared GPU clusters.
const READ_TIMEOUT: Duration = Duration::from_secs(600);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Created once and reused; the inner `reqwest::Client` pools connections.
#[derive(Debug, Clone)]
pub struct HttpChatModel {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpChatModel {
    pub fn new(cfg: &LlmConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(READ_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| Error::collaborator("llm", e))?;
        Ok(Self {
            http,
            base_url: cfg.api_url.trim_end_matches('/').to_owned(),
            api_key: cfg.api_key.clone(),
        })
    }
}

#[async_trait::async_trait]
impl ChatModel for HttpChatModel {
    async fn complete(&self, model: &str, prompt: &str) -> Result<String> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = ChatCompletionRequest {
            model,
            messages: vec![WireMessage {
                role: "user",
                content: prompt,
            }],
            stream: false,
        };

        let mut rb = self.http.post(&url).json(&body);
        if let Some(ref key) = self.api_key {
            rb = rb.bearer_auth(key);
        }

        let resp = rb
            .send()
            .await
            .map_err(|e| Error::collaborator("llm", e))?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(Error::collaborator(
                "llm",
                format!("{url} returned {status}: {text}"),
            ));
        }

        let parsed: ChatCompletionResponse = resp
            .json()
            .await
            .map_err(|e| Error::collaborator("llm", e))?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        tracing::debug!(model, chars = content.len(), "chat completion received");
        Ok(content.trim().to_owned())
    }
}
