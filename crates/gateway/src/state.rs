use std::sync::Arc;

use orpheus_clients::{ContextRetriever, MediaRenderer, SlidePublisher, SlidesClient};
use orpheus_domain::config::Config;
use orpheus_providers::ChatModel;

use crate::layouts::LayoutCatalog;
use crate::runtime::jobs::JobManager;
use crate::runtime::status_store::StatusStore;
use crate::runtime::video_jobs::VideoJobStore;
use crate::runtime::worker::SlideWorkerHandle;

/// Shared application state passed to all API handlers and pipeline runs.
///
/// Fields are grouped by concern:
/// - **Collaborator seams** — LLM, retrieval, publisher (mockable traits)
/// - **Runtime stores** — status fabric, slide jobs, video jobs
/// - **Worker** — producer handle of the FIFO slide queue
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,

    // ── Collaborator seams ────────────────────────────────────────────
    pub llm: Arc<dyn ChatModel>,
    pub retriever: Arc<dyn ContextRetriever>,
    pub publisher: Arc<dyn SlidePublisher>,
    /// Split deployment only: delegate the slide sub-pipeline over HTTP.
    pub slides_remote: Option<Arc<SlidesClient>>,
    pub renderer: Arc<dyn MediaRenderer>,

    // ── Runtime stores ────────────────────────────────────────────────
    pub status: Arc<StatusStore>,
    pub jobs: Arc<JobManager>,
    pub video_jobs: Arc<VideoJobStore>,

    // ── Worker & catalog ──────────────────────────────────────────────
    pub worker: SlideWorkerHandle,
    pub layouts: Arc<LayoutCatalog>,
}

impl AppState {
    /// Public URL of a prompt's video folder.
    pub fn public_folder_url(&self, prompt_id: uuid::Uuid) -> String {
        format!(
            "{}/{prompt_id}/",
            self.config.public_videos_base.trim_end_matches('/')
        )
    }
}
