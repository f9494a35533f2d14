//! Environment-driven configuration.
//!
//! Every knob the control plane recognizes is an environment variable;
//! `Config::from_env` snapshots them once at startup. `validate` reports
//! issues without aborting so operators see all problems in one pass.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize)]
pub struct LlmConfig {
    /// OpenAI-compatible chat endpoint base (`LLAMA_API_URL`).
    pub api_url: String,
    /// Bearer token (`LLAMA_API_KEY`); requests go out unauthenticated
    /// when unset.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Model used for prompt decomposition and slide structure splitting
    /// (`SPLITTING_MODEL`).
    pub splitting_model: String,
    /// Model used for script, per-slide content, narration, and the lecture
    /// summary (`SLIDESGEN_MODEL`).
    pub slidesgen_model: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Listen address for all three HTTP surfaces (`BIND_ADDR`).
    pub bind_addr: String,
    pub llm: LlmConfig,
    /// Document-intelligence retrieval service (`DI_API_URL`).
    pub retrieval_api_url: String,
    /// External slides service (`SLIDES_API_URL`). When set, the prompt
    /// pipeline delegates slide generation over HTTP instead of running the
    /// in-process sub-pipeline.
    pub slides_api_url: Option<String>,
    /// Talking-head renderer (`AVATAR_API_URL`); the worker posts multipart
    /// audio+image to `{base}/infer`.
    pub avatar_api_url: String,
    /// TTS service base (`GEN_AUDIO`); the worker posts to
    /// `{base}/v1/audio/generate`.
    pub tts_api_url: String,
    /// Slide post-processor (`POSTPROCESSING_SERVICE_HOST`).
    pub postprocessing_host: String,
    /// External status service (`STATUS_SERVICE_HOST`). When set, every local
    /// status patch is mirrored there fire-and-forget.
    pub status_service_host: Option<String>,
    /// Per-prompt workspace root (`VIDEO_ROOT`).
    pub video_root: PathBuf,
    /// Public base under which per-prompt folders are served
    /// (`PUBLIC_VIDEOS_BASE`).
    pub public_videos_base: String,
    /// Course-scoped reference voice sample (`VOICE_SAMPLE_PATH`).
    pub voice_sample_path: PathBuf,
    /// Course-scoped talking-head source image (`AVATAR_IMAGE_PATH`).
    pub avatar_image_path: PathBuf,
    /// Theme forwarded to the post-processor (`SLIDES_THEME`).
    pub slides_theme: String,
    /// `ORPHEUS_DEBUG`: swap all collaborator seams for in-source mocks so
    /// the full pipeline can be smoke-tested without live services.
    pub debug_mode: bool,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            bind_addr: env_or("BIND_ADDR", "0.0.0.0:8080"),
            llm: LlmConfig {
                api_url: env_or("LLAMA_API_URL", "http://localhost:11434"),
                api_key: env_opt("LLAMA_API_KEY"),
                splitting_model: env_or("SPLITTING_MODEL", "gemma3:27b"),
                slidesgen_model: env_or("SLIDESGEN_MODEL", "gemma3:27b"),
            },
            retrieval_api_url: env_or("DI_API_URL", "http://docint:25565"),
            slides_api_url: env_opt("SLIDES_API_URL"),
            avatar_api_url: env_or("AVATAR_API_URL", "http://localhost:8000"),
            tts_api_url: env_or("GEN_AUDIO", "http://localhost:7000"),
            postprocessing_host: env_or("POSTPROCESSING_SERVICE_HOST", "http://localhost:8085"),
            status_service_host: env_opt("STATUS_SERVICE_HOST"),
            video_root: PathBuf::from(env_or("VIDEO_ROOT", "/data/jobs")),
            public_videos_base: env_or("PUBLIC_VIDEOS_BASE", "/videos/jobs"),
            voice_sample_path: PathBuf::from(env_or(
                "VOICE_SAMPLE_PATH",
                "/app/database/voice_sample/voice.mp3",
            )),
            avatar_image_path: PathBuf::from(env_or(
                "AVATAR_IMAGE_PATH",
                "/app/database/avatar_sample/avatar.png",
            )),
            slides_theme: env_or("SLIDES_THEME", "default"),
            debug_mode: matches!(
                env_or("ORPHEUS_DEBUG", "").as_str(),
                "1" | "true" | "yes"
            ),
        }
    }

    /// Check the snapshot for operator mistakes. Errors prevent startup;
    /// warnings are logged and tolerated.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.bind_addr.parse::<std::net::SocketAddr>().is_err() {
            issues.push(ConfigIssue::error(format!(
                "BIND_ADDR '{}' is not a valid socket address",
                self.bind_addr
            )));
        }
        for (name, url) in [
            ("LLAMA_API_URL", &self.llm.api_url),
            ("DI_API_URL", &self.retrieval_api_url),
            ("AVATAR_API_URL", &self.avatar_api_url),
            ("GEN_AUDIO", &self.tts_api_url),
            ("POSTPROCESSING_SERVICE_HOST", &self.postprocessing_host),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                issues.push(ConfigIssue::error(format!(
                    "{name} '{url}' must be an http(s) URL"
                )));
            }
        }
        if !self.debug_mode {
            if self.llm.api_key.is_none() {
                issues.push(ConfigIssue::warning(
                    "LLAMA_API_KEY unset; LLM requests will be unauthenticated",
                ));
            }
            if !self.voice_sample_path.is_file() {
                issues.push(ConfigIssue::warning(format!(
                    "voice sample {} not found; TTS calls will fail",
                    self.voice_sample_path.display()
                )));
            }
            if !self.avatar_image_path.is_file() {
                issues.push(ConfigIssue::warning(format!(
                    "avatar image {} not found; talking-head calls will fail",
                    self.avatar_image_path.display()
                )));
            }
        }

        issues
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Issues
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: ConfigSeverity,
    pub message: String,
}

impl ConfigIssue {
    fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: ConfigSeverity::Warning,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            severity: ConfigSeverity::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}
