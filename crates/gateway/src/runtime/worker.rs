//! The slide worker: a single long-lived consumer of the process-wide FIFO
//! queue of slide tasks.
//!
//! GPU-bound collaborators (TTS, talking-head) cannot take concurrent load,
//! so all rendering for all prompts is serialized here. Producers enqueue
//! without blocking; the worker drains at whatever rate the collaborators
//! permit. Within a task audio strictly precedes video; across tasks the
//! queue order is the execution order. Shutdown is honored between tasks.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use orpheus_clients::MediaRenderer;
use orpheus_domain::prompt::SlideTask;
use orpheus_domain::status::{AvatarElementStatus, StatusPatch, StepStatus};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::status_store::StatusStore;
use super::video_jobs::VideoJobStore;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Handle
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Producer side of the queue. Cloned into every pipeline run.
#[derive(Clone)]
pub struct SlideWorkerHandle {
    tx: mpsc::UnboundedSender<SlideTask>,
}

impl SlideWorkerHandle {
    /// Never blocks; fails only after worker shutdown.
    pub fn enqueue(&self, task: SlideTask) -> orpheus_domain::Result<()> {
        self.tx
            .send(task)
            .map_err(|_| orpheus_domain::Error::ShuttingDown)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Worker
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct WorkerContext {
    pub status: Arc<StatusStore>,
    pub video_jobs: Arc<VideoJobStore>,
    pub renderer: Arc<dyn MediaRenderer>,
    /// Per-prompt workspaces live at `<video_root>/<promptId>/`.
    pub video_root: PathBuf,
    pub voice_sample: PathBuf,
    pub avatar_image: PathBuf,
}

/// Spawn the single consumer. The returned handle is the only way to feed
/// it; the join handle completes once the queue closes or `shutdown` fires.
pub fn spawn(
    ctx: WorkerContext,
    shutdown: CancellationToken,
) -> (SlideWorkerHandle, tokio::task::JoinHandle<()>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let join = tokio::spawn(run(ctx, rx, shutdown));
    (SlideWorkerHandle { tx }, join)
}

async fn run(
    ctx: WorkerContext,
    mut rx: mpsc::UnboundedReceiver<SlideTask>,
    shutdown: CancellationToken,
) {
    tracing::info!("slide worker started");
    loop {
        let task = tokio::select! {
            _ = shutdown.cancelled() => break,
            task = rx.recv() => match task {
                Some(task) => task,
                None => break,
            },
        };
        process_task(&ctx, task).await;
    }
    tracing::info!("slide worker stopped");
}

/// Render one slide: audio, then video. Failures patch the affected slot and
/// never abort the loop.
async fn process_task(ctx: &WorkerContext, task: SlideTask) {
    let prompt_id = task.prompt_id;
    let index = task.slide_index.max(1);
    // Status slots are 0-based; task indices are 1-based like the filenames.
    let slot = (index - 1) as usize;

    tracing::info!(%prompt_id, index, "rendering slide avatar");

    let job_dir = ctx.video_root.join(prompt_id.to_string());
    if let Err(err) = tokio::fs::create_dir_all(&job_dir).await {
        tracing::error!(%prompt_id, %err, "cannot create job workspace");
        patch_slot(ctx, prompt_id, slot, StepStatus::Failed, StepStatus::NotStarted);
        ctx.video_jobs.task_finished(prompt_id, true);
        return;
    }

    // ── Audio ────────────────────────────────────────────────────────
    patch_slot(ctx, prompt_id, slot, StepStatus::InProgress, StepStatus::NotStarted);

    let wav_path = job_dir.join(format!("{index}.wav"));
    match ctx
        .renderer
        .render_audio(&task.narration_text, &ctx.voice_sample, &wav_path)
        .await
    {
        Ok(bytes) => {
            tracing::debug!(%prompt_id, index, bytes, "audio rendered");
        }
        Err(err) => {
            tracing::error!(%prompt_id, index, %err, "audio rendering failed");
            patch_slot(ctx, prompt_id, slot, StepStatus::Failed, StepStatus::NotStarted);
            ctx.video_jobs.task_finished(prompt_id, true);
            return;
        }
    }

    // ── Video ────────────────────────────────────────────────────────
    patch_slot(ctx, prompt_id, slot, StepStatus::Done, StepStatus::InProgress);

    let temp_path = job_dir.join(format!(".{index}.mp4.part"));
    let final_path = job_dir.join(format!("{index}.mp4"));
    match ctx
        .renderer
        .render_video(&wav_path, &ctx.avatar_image, &temp_path)
        .await
    {
        Ok(0) => {
            tracing::error!(%prompt_id, index, "empty video body received");
            let _ = tokio::fs::remove_file(&temp_path).await;
            patch_slot(ctx, prompt_id, slot, StepStatus::Done, StepStatus::Failed);
            ctx.video_jobs.task_finished(prompt_id, true);
        }
        Ok(bytes) => match publish_video(&temp_path, &final_path).await {
            Ok(()) => {
                tracing::info!(%prompt_id, index, bytes, "slide video published");
                patch_slot(ctx, prompt_id, slot, StepStatus::Done, StepStatus::Done);
                ctx.video_jobs.task_finished(prompt_id, false);
            }
            Err(err) => {
                tracing::error!(%prompt_id, index, %err, "video publish failed");
                patch_slot(ctx, prompt_id, slot, StepStatus::Done, StepStatus::Failed);
                ctx.video_jobs.task_finished(prompt_id, true);
            }
        },
        Err(err) => {
            tracing::error!(%prompt_id, index, %err, "video rendering failed");
            let _ = tokio::fs::remove_file(&temp_path).await;
            patch_slot(ctx, prompt_id, slot, StepStatus::Done, StepStatus::Failed);
            ctx.video_jobs.task_finished(prompt_id, true);
        }
    }
}

/// Atomic rename publishes the finished file; readers of the public folder
/// never observe a partial MP4.
async fn publish_video(temp: &Path, final_path: &Path) -> std::io::Result<()> {
    tokio::fs::rename(temp, final_path).await
}

fn patch_slot(ctx: &WorkerContext, prompt_id: Uuid, slot: usize, audio: StepStatus, video: StepStatus) {
    ctx.status.update(
        prompt_id,
        &StatusPatch::avatar_slot(slot, AvatarElementStatus { audio, video }),
    );
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::video_jobs::VideoJobState;
    use chrono::Duration;
    use orpheus_domain::persona::{Language, Persona, Preferences, Role};
    use orpheus_domain::slides::{SlideDraft, SlideStructure};
    use parking_lot::Mutex;

    /// Recorded rendering event: kind ('a'/'v'), prompt id, slide index.
    type Event = (char, Uuid, u32);

    #[derive(Default)]
    struct RecordingRenderer {
        events: Mutex<Vec<Event>>,
        /// (prompt, index) pairs whose audio call should fail.
        fail_audio: Vec<u32>,
        /// Indices whose video body should come back empty.
        empty_video: Vec<u32>,
    }

    fn index_from(dest: &Path) -> u32 {
        let name = dest.file_name().unwrap().to_string_lossy();
        name.trim_start_matches('.')
            .split('.')
            .next()
            .unwrap()
            .parse()
            .unwrap()
    }

    fn prompt_from(dest: &Path) -> Uuid {
        dest.parent()
            .unwrap()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .parse()
            .unwrap()
    }

    #[async_trait::async_trait]
    impl MediaRenderer for RecordingRenderer {
        async fn render_audio(
            &self,
            _narration: &str,
            _voice_sample: &Path,
            dest: &Path,
        ) -> orpheus_domain::Result<u64> {
            let index = index_from(dest);
            self.events.lock().push(('a', prompt_from(dest), index));
            if self.fail_audio.contains(&index) {
                return Err(orpheus_domain::Error::collaborator("tts", "boom"));
            }
            tokio::fs::write(dest, b"RIFFstub").await?;
            Ok(8)
        }

        async fn render_video(
            &self,
            _audio: &Path,
            _source_image: &Path,
            dest: &Path,
        ) -> orpheus_domain::Result<u64> {
            let index = index_from(dest);
            self.events.lock().push(('v', prompt_from(dest), index));
            if self.empty_video.contains(&index) {
                tokio::fs::write(dest, b"").await?;
                return Ok(0);
            }
            tokio::fs::write(dest, b"mp4stub").await?;
            Ok(7)
        }
    }

    fn persona() -> Persona {
        Persona {
            language: Language::English,
            preferences: Preferences::default(),
            enrolled_courses: vec![],
            role: Role::Student,
        }
    }

    fn task(prompt_id: Uuid, index: u32) -> SlideTask {
        SlideTask {
            prompt_id,
            slide_index: index,
            narration_text: format!("narration {index}"),
            persona: persona(),
            course_id: "cs001".into(),
        }
    }

    struct Fixture {
        status: Arc<StatusStore>,
        video_jobs: Arc<VideoJobStore>,
        renderer: Arc<RecordingRenderer>,
        root: tempfile::TempDir,
    }

    impl Fixture {
        fn new(renderer: RecordingRenderer) -> Self {
            Self {
                status: Arc::new(StatusStore::new(Duration::hours(24), None)),
                video_jobs: Arc::new(VideoJobStore::new(Duration::hours(24))),
                renderer: Arc::new(renderer),
                root: tempfile::tempdir().unwrap(),
            }
        }

        fn seed_structure(&self, prompt_id: Uuid, pages: u32) {
            self.status.update(
                prompt_id,
                &StatusPatch {
                    slide_structure: Some(SlideStructure {
                        pages: (1..=pages)
                            .map(|i| SlideDraft {
                                index: i,
                                content: String::new(),
                                layout_name: "default".into(),
                            })
                            .collect(),
                    }),
                    ..StatusPatch::default()
                },
            );
        }

        /// Spawn the worker, feed it the tasks, close the queue, and wait
        /// for the drain.
        async fn drain(&self, tasks: Vec<SlideTask>) {
            let ctx = WorkerContext {
                status: self.status.clone(),
                video_jobs: self.video_jobs.clone(),
                renderer: self.renderer.clone(),
                video_root: self.root.path().to_path_buf(),
                voice_sample: self.root.path().join("voice.mp3"),
                avatar_image: self.root.path().join("avatar.png"),
            };
            let (handle, join) = spawn(ctx, CancellationToken::new());
            for task in tasks {
                handle.enqueue(task).unwrap();
            }
            drop(handle);
            join.await.unwrap();
        }
    }

    #[tokio::test]
    async fn fifo_order_across_prompts_audio_before_video() {
        let fx = Fixture::new(RecordingRenderer::default());
        let p1 = Uuid::new_v4();
        let p2 = Uuid::new_v4();
        fx.seed_structure(p1, 3);
        fx.seed_structure(p2, 3);
        fx.video_jobs.start(p1, 3, String::new());
        fx.video_jobs.start(p2, 3, String::new());

        fx.drain(vec![
            task(p1, 1),
            task(p1, 2),
            task(p1, 3),
            task(p2, 1),
            task(p2, 2),
            task(p2, 3),
        ])
        .await;

        let events = fx.renderer.events.lock().clone();
        let expected: Vec<Event> = vec![
            ('a', p1, 1),
            ('v', p1, 1),
            ('a', p1, 2),
            ('v', p1, 2),
            ('a', p1, 3),
            ('v', p1, 3),
            ('a', p2, 1),
            ('v', p2, 1),
            ('a', p2, 2),
            ('v', p2, 2),
            ('a', p2, 3),
            ('v', p2, 3),
        ];
        assert_eq!(events, expected);

        for (p, i) in [(p1, 1), (p1, 3), (p2, 2)] {
            assert!(fx.root.path().join(p.to_string()).join(format!("{i}.mp4")).is_file());
            assert!(fx.root.path().join(p.to_string()).join(format!("{i}.wav")).is_file());
        }
        assert_eq!(fx.video_jobs.get(p1).unwrap().state, VideoJobState::Done);
    }

    #[tokio::test]
    async fn audio_failure_skips_video_and_worker_continues() {
        let fx = Fixture::new(RecordingRenderer {
            fail_audio: vec![1],
            ..RecordingRenderer::default()
        });
        let p = Uuid::new_v4();
        fx.seed_structure(p, 2);
        fx.video_jobs.start(p, 2, String::new());

        fx.drain(vec![task(p, 1), task(p, 2)]).await;

        let events = fx.renderer.events.lock().clone();
        assert_eq!(events, vec![('a', p, 1), ('a', p, 2), ('v', p, 2)]);

        let status = fx.status.get(p);
        assert_eq!(status.steps_avatar_generation[0].audio, StepStatus::Failed);
        assert_eq!(status.steps_avatar_generation[0].video, StepStatus::NotStarted);
        assert_eq!(status.steps_avatar_generation[1].audio, StepStatus::Done);
        assert_eq!(status.steps_avatar_generation[1].video, StepStatus::Done);

        let dir = fx.root.path().join(p.to_string());
        assert!(!dir.join("1.mp4").exists());
        assert!(dir.join("2.mp4").is_file());
        assert_eq!(fx.video_jobs.get(p).unwrap().failed_slides, 1);
    }

    #[tokio::test]
    async fn empty_video_body_fails_slot_without_publishing() {
        let fx = Fixture::new(RecordingRenderer {
            empty_video: vec![1],
            ..RecordingRenderer::default()
        });
        let p = Uuid::new_v4();
        fx.seed_structure(p, 1);
        fx.video_jobs.start(p, 1, String::new());

        fx.drain(vec![task(p, 1)]).await;

        let status = fx.status.get(p);
        assert_eq!(status.steps_avatar_generation[0].audio, StepStatus::Done);
        assert_eq!(status.steps_avatar_generation[0].video, StepStatus::Failed);

        let dir = fx.root.path().join(p.to_string());
        assert!(!dir.join("1.mp4").exists());
        assert!(!dir.join(".1.mp4.part").exists());
    }

    #[tokio::test]
    async fn shutdown_stops_between_tasks() {
        let fx = Fixture::new(RecordingRenderer::default());
        let p = Uuid::new_v4();
        fx.seed_structure(p, 1);

        let ctx = WorkerContext {
            status: fx.status.clone(),
            video_jobs: fx.video_jobs.clone(),
            renderer: fx.renderer.clone(),
            video_root: fx.root.path().to_path_buf(),
            voice_sample: fx.root.path().join("voice.mp3"),
            avatar_image: fx.root.path().join("avatar.png"),
        };
        let shutdown = CancellationToken::new();
        let (handle, join) = spawn(ctx, shutdown.clone());
        shutdown.cancel();
        join.await.unwrap();
        // Enqueueing into a stopped worker reports shutdown.
        assert!(handle.enqueue(task(p, 1)).is_err());
    }
}
