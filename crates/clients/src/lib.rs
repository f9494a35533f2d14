//! Typed clients for the collaborator services the control plane talks to:
//! document-intelligence retrieval, TTS, the talking-head renderer, the slide
//! post-processor, the external status service, and (for split deployments)
//! the slides surface itself.
//!
//! Each client is a thin wrapper over a pooled `reqwest::Client`: request and
//! response shape, timeouts, and streaming downloads, nothing else. The
//! seams the pipeline and worker depend on ([`ContextRetriever`],
//! [`MediaRenderer`], [`SlidePublisher`]) are traits so tests and debug mode
//! can substitute mocks.

pub mod media;
pub mod postprocessing;
pub mod retrieval;
pub mod slides_remote;
pub mod status_remote;

pub use media::{HttpMediaRenderer, MediaRenderer};
pub use postprocessing::{HttpSlidePublisher, SlidePublisher};
pub use retrieval::{ContextRetriever, HttpRetrievalClient};
pub use slides_remote::SlidesClient;
pub use status_remote::StatusServiceClient;

/// Connect quickly or not at all; collaborator reads may run for minutes.
pub(crate) const CONNECT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);
pub(crate) const LONG_READ_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(600);
