//! Coarse progress accounting for the slide-content sub-pipeline.
//!
//! Deliberately independent of the status fabric so the slides endpoint can
//! answer without coupling to avatar progress. Entries are evicted after an
//! idle TTL on every mutating call.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use uuid::Uuid;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Job record
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone)]
pub struct JobRecord {
    pub total: u32,
    pub achieved: u32,
    pub error: bool,
    pub uploaded: bool,
    pub web_url: Option<String>,
    pub pdf_url: Option<String>,
    pub last_updated: DateTime<Utc>,
}

impl JobRecord {
    /// `FAILED` if errored, `DONE` only when the upload landed and every
    /// page materialized, `IN_PROGRESS` otherwise.
    pub fn derived_status(&self) -> &'static str {
        if self.error {
            "FAILED"
        } else if self.uploaded && self.achieved == self.total {
            "DONE"
        } else {
            "IN_PROGRESS"
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Job manager
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct JobManager {
    jobs: Mutex<HashMap<Uuid, JobRecord>>,
    ttl: Duration,
}

impl JobManager {
    pub fn new(ttl: Duration) -> Self {
        Self {
            jobs: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    pub fn init(&self, prompt_id: Uuid, total_pages: u32) {
        let mut jobs = self.jobs.lock();
        Self::evict_stale(&mut jobs, self.ttl);
        jobs.insert(
            prompt_id,
            JobRecord {
                total: total_pages,
                achieved: 0,
                error: false,
                uploaded: false,
                web_url: None,
                pdf_url: None,
                last_updated: Utc::now(),
            },
        );
    }

    /// Record one materialized page. Returns the new achieved count
    /// (0 when the job is unknown).
    pub fn finish_page(&self, prompt_id: Uuid) -> u32 {
        let mut jobs = self.jobs.lock();
        Self::evict_stale(&mut jobs, self.ttl);
        match jobs.get_mut(&prompt_id) {
            Some(job) => {
                job.achieved = (job.achieved + 1).min(job.total);
                job.last_updated = Utc::now();
                job.achieved
            }
            None => 0,
        }
    }

    pub fn fail(&self, prompt_id: Uuid) {
        let mut jobs = self.jobs.lock();
        Self::evict_stale(&mut jobs, self.ttl);
        if let Some(job) = jobs.get_mut(&prompt_id) {
            job.error = true;
            job.last_updated = Utc::now();
        }
    }

    /// Record the upload. URLs are frozen on first success.
    pub fn finish_upload(&self, prompt_id: Uuid, web_url: Option<String>, pdf_url: Option<String>) {
        let mut jobs = self.jobs.lock();
        Self::evict_stale(&mut jobs, self.ttl);
        if let Some(job) = jobs.get_mut(&prompt_id) {
            if !job.uploaded {
                job.uploaded = true;
                job.web_url = web_url;
                job.pdf_url = pdf_url;
            }
            job.last_updated = Utc::now();
        }
    }

    pub fn get_status(&self, prompt_id: Uuid) -> Option<JobRecord> {
        let jobs = self.jobs.lock();
        jobs.get(&prompt_id).cloned()
    }

    fn evict_stale(jobs: &mut HashMap<Uuid, JobRecord>, ttl: Duration) {
        let now = Utc::now();
        jobs.retain(|prompt_id, job| {
            let keep = job.last_updated + ttl >= now;
            if !keep {
                tracing::debug!(%prompt_id, "evicting stale slide job");
            }
            keep
        });
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> JobManager {
        JobManager::new(Duration::hours(24))
    }

    #[test]
    fn pages_accumulate_and_saturate_at_total() {
        let m = manager();
        let id = Uuid::new_v4();
        m.init(id, 2);
        assert_eq!(m.finish_page(id), 1);
        assert_eq!(m.finish_page(id), 2);
        assert_eq!(m.finish_page(id), 2);
        assert_eq!(m.get_status(id).unwrap().achieved, 2);
    }

    #[test]
    fn derived_status_matrix() {
        let m = manager();
        let id = Uuid::new_v4();
        m.init(id, 1);
        assert_eq!(m.get_status(id).unwrap().derived_status(), "IN_PROGRESS");

        // Uploaded but not all pages: still in progress.
        m.finish_upload(id, Some("w".into()), Some("p".into()));
        assert_eq!(m.get_status(id).unwrap().derived_status(), "IN_PROGRESS");

        m.finish_page(id);
        assert_eq!(m.get_status(id).unwrap().derived_status(), "DONE");

        m.fail(id);
        assert_eq!(m.get_status(id).unwrap().derived_status(), "FAILED");
    }

    #[test]
    fn upload_urls_are_frozen() {
        let m = manager();
        let id = Uuid::new_v4();
        m.init(id, 1);
        m.finish_upload(id, Some("web-1".into()), Some("pdf-1".into()));
        m.finish_upload(id, Some("web-2".into()), Some("pdf-2".into()));

        let job = m.get_status(id).unwrap();
        assert_eq!(job.web_url.as_deref(), Some("web-1"));
        assert_eq!(job.pdf_url.as_deref(), Some("pdf-1"));
    }

    #[test]
    fn unknown_prompt_yields_none_and_mutations_are_noops() {
        let m = manager();
        let id = Uuid::new_v4();
        assert!(m.get_status(id).is_none());
        assert_eq!(m.finish_page(id), 0);
        m.fail(id);
        m.finish_upload(id, None, None);
        assert!(m.get_status(id).is_none());
    }

    #[test]
    fn stale_jobs_are_evicted_on_mutation() {
        let m = JobManager::new(Duration::zero());
        let stale = Uuid::new_v4();
        m.init(stale, 3);
        // Any later mutating call sweeps expired entries.
        m.init(Uuid::new_v4(), 1);
        assert!(m.get_status(stale).is_none());
    }
}
