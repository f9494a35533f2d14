//! Composition root: build every store, client, and the worker once at
//! startup and hand them to the handlers through [`AppState`]. No
//! module-level singletons anywhere.

use std::sync::Arc;

use chrono::{Duration, Utc};
use orpheus_clients::{
    HttpMediaRenderer, HttpRetrievalClient, HttpSlidePublisher, SlidesClient, StatusServiceClient,
};
use orpheus_domain::config::Config;
use orpheus_domain::Result;
use orpheus_providers::HttpChatModel;
use tokio_util::sync::CancellationToken;

use crate::layouts::LayoutCatalog;
use crate::pipeline::debug::{MockChatModel, MockMediaRenderer, MockRetriever, MockSlidePublisher};
use crate::runtime::jobs::JobManager;
use crate::runtime::status_store::StatusStore;
use crate::runtime::video_jobs::VideoJobStore;
use crate::runtime::worker::{self, WorkerContext};
use crate::state::AppState;

/// Idle records (status, jobs, video jobs) are dropped after a day.
const IDLE_TTL_HOURS: i64 = 24;
/// Cadence of the background status sweep.
const PURGE_INTERVAL_SECS: u64 = 3600;

pub struct Runtime {
    pub state: AppState,
    pub shutdown: CancellationToken,
    pub worker: tokio::task::JoinHandle<()>,
}

/// Build the full runtime. Must be called inside a tokio runtime; spawns the
/// slide worker and the periodic status sweep.
pub fn build(config: Config) -> Result<Runtime> {
    let config = Arc::new(config);
    let ttl = Duration::hours(IDLE_TTL_HOURS);

    let mirror = match &config.status_service_host {
        Some(host) => Some(Arc::new(StatusServiceClient::new(host)?)),
        None => None,
    };
    let status = Arc::new(StatusStore::new(ttl, mirror));
    let jobs = Arc::new(JobManager::new(ttl));
    let video_jobs = Arc::new(VideoJobStore::new(ttl));
    let layouts = Arc::new(LayoutCatalog::default());

    // Collaborator seams: live HTTP clients, or in-source mocks when
    // ORPHEUS_DEBUG asks for a self-contained smoke run.
    let (llm, retriever, publisher, renderer): (
        Arc<dyn orpheus_providers::ChatModel>,
        Arc<dyn orpheus_clients::ContextRetriever>,
        Arc<dyn orpheus_clients::SlidePublisher>,
        Arc<dyn orpheus_clients::MediaRenderer>,
    ) = if config.debug_mode {
        tracing::warn!("ORPHEUS_DEBUG set: all collaborators are mocked");
        (
            Arc::new(MockChatModel),
            Arc::new(MockRetriever),
            Arc::new(MockSlidePublisher),
            Arc::new(MockMediaRenderer),
        )
    } else {
        (
            Arc::new(HttpChatModel::new(&config.llm)?),
            Arc::new(HttpRetrievalClient::new(&config.retrieval_api_url)?),
            Arc::new(HttpSlidePublisher::new(&config.postprocessing_host)?),
            Arc::new(HttpMediaRenderer::new(
                &config.tts_api_url,
                &config.avatar_api_url,
            )?),
        )
    };

    let slides_remote = match &config.slides_api_url {
        Some(url) => Some(Arc::new(SlidesClient::new(url)?)),
        None => None,
    };

    let shutdown = CancellationToken::new();
    let (worker_handle, worker_join) = worker::spawn(
        WorkerContext {
            status: status.clone(),
            video_jobs: video_jobs.clone(),
            renderer: renderer.clone(),
            video_root: config.video_root.clone(),
            voice_sample: config.voice_sample_path.clone(),
            avatar_image: config.avatar_image_path.clone(),
        },
        shutdown.clone(),
    );

    let state = AppState {
        config,
        llm,
        retriever,
        publisher,
        slides_remote,
        renderer,
        status,
        jobs,
        video_jobs,
        worker: worker_handle,
        layouts,
    };

    spawn_status_sweep(state.status.clone(), shutdown.clone());

    Ok(Runtime {
        state,
        shutdown,
        worker: worker_join,
    })
}

fn spawn_status_sweep(status: Arc<StatusStore>, shutdown: CancellationToken) {
    tokio::spawn(async move {
        let mut ticker =
            tokio::time::interval(std::time::Duration::from_secs(PURGE_INTERVAL_SECS));
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    let evicted = status.purge_stale(Utc::now());
                    if evicted > 0 {
                        tracing::info!(evicted, "purged stale status records");
                    }
                }
            }
        }
    });
}
