//! Per-prompt avatar video job records.
//!
//! Seeded when narration tasks are enqueued, advanced by the slide worker as
//! tasks drain. Backs the `/v1/video/{promptId}/status` surface, including
//! the ETA heuristic: 8 s overhead plus 6 s per slide.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VideoJobState {
    InProgress,
    Done,
    Failed,
}

#[derive(Debug, Clone)]
pub struct VideoJob {
    pub state: VideoJobState,
    pub total_slides: u32,
    pub finished_slides: u32,
    pub failed_slides: u32,
    pub result_url: String,
    pub started_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub expected_duration_secs: i64,
}

impl VideoJob {
    /// Remaining seconds of the initial estimate; 0 once terminal.
    pub fn eta_seconds(&self, now: DateTime<Utc>) -> i64 {
        if self.state != VideoJobState::InProgress {
            return 0;
        }
        let elapsed = (now - self.started_at).num_seconds();
        (self.expected_duration_secs - elapsed).max(0)
    }
}

fn estimate_total_seconds(slide_count: u32) -> i64 {
    8 + 6 * i64::from(slide_count)
}

pub struct VideoJobStore {
    jobs: Mutex<HashMap<Uuid, VideoJob>>,
    ttl: Duration,
}

impl VideoJobStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            jobs: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Seed the record when the first narration for a prompt is enqueued.
    pub fn start(&self, prompt_id: Uuid, total_slides: u32, result_url: String) {
        let mut jobs = self.jobs.lock();
        Self::evict_stale(&mut jobs, self.ttl);
        let now = Utc::now();
        jobs.insert(
            prompt_id,
            VideoJob {
                state: VideoJobState::InProgress,
                total_slides,
                finished_slides: 0,
                failed_slides: 0,
                result_url,
                started_at: now,
                last_updated: now,
                expected_duration_secs: estimate_total_seconds(total_slides),
            },
        );
    }

    /// Record one drained task. The job turns DONE when all slides have been
    /// attempted; per-slide failures are counted, not terminal.
    pub fn task_finished(&self, prompt_id: Uuid, failed: bool) {
        let mut jobs = self.jobs.lock();
        Self::evict_stale(&mut jobs, self.ttl);
        if let Some(job) = jobs.get_mut(&prompt_id) {
            job.finished_slides = (job.finished_slides + 1).min(job.total_slides);
            if failed {
                job.failed_slides += 1;
            }
            if job.finished_slides == job.total_slides {
                job.state = VideoJobState::Done;
            }
            job.last_updated = Utc::now();
        }
    }

    /// Terminal failure for the whole prompt (e.g. workspace unusable).
    pub fn fail(&self, prompt_id: Uuid) {
        let mut jobs = self.jobs.lock();
        Self::evict_stale(&mut jobs, self.ttl);
        if let Some(job) = jobs.get_mut(&prompt_id) {
            job.state = VideoJobState::Failed;
            job.last_updated = Utc::now();
        }
    }

    pub fn get(&self, prompt_id: Uuid) -> Option<VideoJob> {
        let jobs = self.jobs.lock();
        jobs.get(&prompt_id).cloned()
    }

    fn evict_stale(jobs: &mut HashMap<Uuid, VideoJob>, ttl: Duration) {
        let now = Utc::now();
        jobs.retain(|_, job| job.last_updated + ttl >= now);
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> VideoJobStore {
        VideoJobStore::new(Duration::hours(24))
    }

    #[test]
    fn job_completes_after_all_tasks_drain() {
        let s = store();
        let id = Uuid::new_v4();
        s.start(id, 2, "/videos/jobs/x/".into());

        s.task_finished(id, false);
        assert_eq!(s.get(id).unwrap().state, VideoJobState::InProgress);

        s.task_finished(id, true);
        let job = s.get(id).unwrap();
        assert_eq!(job.state, VideoJobState::Done);
        assert_eq!(job.failed_slides, 1);
    }

    #[test]
    fn eta_shrinks_and_zeroes_when_terminal() {
        let s = store();
        let id = Uuid::new_v4();
        s.start(id, 3, String::new());

        let job = s.get(id).unwrap();
        assert_eq!(job.expected_duration_secs, 8 + 18);
        assert!(job.eta_seconds(job.started_at) <= 26);
        assert_eq!(job.eta_seconds(job.started_at + Duration::hours(1)), 0);

        s.fail(id);
        let failed = s.get(id).unwrap();
        assert_eq!(failed.eta_seconds(failed.started_at), 0);
    }

    #[test]
    fn unknown_prompt_is_none() {
        assert!(store().get(Uuid::new_v4()).is_none());
    }
}
