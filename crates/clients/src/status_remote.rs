//! Client for an externalized status service.
//!
//! The gateway keeps its authoritative status store in-process; when
//! `STATUS_SERVICE_HOST` is configured, patches are mirrored there so
//! dashboards pointed at the shared service stay in sync. Mirror failures
//! are the caller's to log and swallow; a broken mirror must never stall
//! the pipeline.

use std::time::Duration;

use orpheus_domain::status::StatusPatch;
use orpheus_domain::{Error, Result};
use uuid::Uuid;

use crate::CONNECT_TIMEOUT;

/// Status patches are tiny; a mirror that cannot answer quickly is down.
const MIRROR_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct StatusServiceClient {
    http: reqwest::Client,
    base_url: String,
}

impl StatusServiceClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(MIRROR_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| Error::collaborator("status", e))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    pub async fn update(&self, prompt_id: Uuid, patch: &StatusPatch) -> Result<()> {
        let url = format!("{}/status/{prompt_id}/update", self.base_url);
        let resp = self
            .http
            .patch(&url)
            .json(patch)
            .send()
            .await
            .map_err(|e| Error::collaborator("status", e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::collaborator(
                "status",
                format!("{url} returned {status}: {body}"),
            ));
        }
        Ok(())
    }
}
