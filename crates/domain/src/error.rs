/// Shared error type used across all Orpheus crates.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Malformed request body or missing required field. Maps to HTTP 400.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Unknown prompt id on an endpoint that requires prior state. Maps to 404.
    #[error("not found: {0}")]
    NotFound(String),

    /// Connect failure, timeout, or 5xx from a collaborator service.
    #[error("collaborator {service}: {message}")]
    Collaborator { service: String, message: String },

    /// LLM reply that could not be coerced into the expected JSON shape,
    /// even after fence stripping and brace scanning.
    #[error("malformed LLM output: {0}")]
    MalformedLlmOutput(String),

    #[error("filesystem: {0}")]
    Filesystem(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config: {0}")]
    Config(String),

    /// Cooperative exit between worker tasks.
    #[error("shutting down")]
    ShuttingDown,
}

impl Error {
    /// Convenience constructor for collaborator failures.
    pub fn collaborator(service: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Collaborator {
            service: service.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
