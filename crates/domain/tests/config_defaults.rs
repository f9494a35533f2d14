//! Config snapshot defaults and validation.
//!
//! These tests avoid mutating the process environment; they exercise the
//! defaults (no relevant vars set in the test environment) and the validator
//! on hand-built snapshots.

use std::path::PathBuf;

use orpheus_domain::config::{Config, ConfigSeverity, LlmConfig};

fn base_config() -> Config {
    Config {
        bind_addr: "0.0.0.0:8080".into(),
        llm: LlmConfig {
            api_url: "http://localhost:11434".into(),
            api_key: Some("key".into()),
            splitting_model: "gemma3:27b".into(),
            slidesgen_model: "gemma3:27b".into(),
        },
        retrieval_api_url: "http://docint:25565".into(),
        slides_api_url: None,
        avatar_api_url: "http://localhost:8000".into(),
        tts_api_url: "http://localhost:7000".into(),
        postprocessing_host: "http://localhost:8085".into(),
        status_service_host: None,
        video_root: PathBuf::from("/data/jobs"),
        public_videos_base: "/videos/jobs".into(),
        voice_sample_path: PathBuf::from("/nonexistent/voice.mp3"),
        avatar_image_path: PathBuf::from("/nonexistent/avatar.png"),
        slides_theme: "default".into(),
        debug_mode: false,
    }
}

#[test]
fn valid_config_yields_no_errors() {
    let issues = base_config().validate();
    assert!(issues
        .iter()
        .all(|i| i.severity != ConfigSeverity::Error), "{issues:?}");
}

#[test]
fn bad_bind_addr_is_an_error() {
    let mut cfg = base_config();
    cfg.bind_addr = "not-an-addr".into();
    let issues = cfg.validate();
    assert!(issues.iter().any(|i| i.severity == ConfigSeverity::Error));
}

#[test]
fn non_http_collaborator_url_is_an_error() {
    let mut cfg = base_config();
    cfg.retrieval_api_url = "docint:25565".into();
    let issues = cfg.validate();
    assert!(issues
        .iter()
        .any(|i| i.severity == ConfigSeverity::Error && i.message.contains("DI_API_URL")));
}

#[test]
fn missing_media_files_warn_outside_debug_mode() {
    let cfg = base_config();
    let issues = cfg.validate();
    assert!(issues
        .iter()
        .any(|i| i.severity == ConfigSeverity::Warning && i.message.contains("voice sample")));

    let mut debug = base_config();
    debug.debug_mode = true;
    assert!(debug.validate().is_empty());
}
