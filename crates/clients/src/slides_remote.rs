//! Client for an externally deployed slides surface.
//!
//! In the default single-process deployment the prompt pipeline calls the
//! slide sub-pipeline directly; when `SLIDES_API_URL` points at a separate
//! slides service, this client carries the same contract over HTTP.

use orpheus_domain::slides::{GenerationAcceptedResponse, GenerationStatusResponse, SlideGenerationRequest};
use orpheus_domain::{Error, Result};
use uuid::Uuid;

use crate::{CONNECT_TIMEOUT, LONG_READ_TIMEOUT};

#[derive(Debug, Clone)]
pub struct SlidesClient {
    http: reqwest::Client,
    base_url: String,
}

impl SlidesClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(LONG_READ_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| Error::collaborator("slides", e))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    pub async fn generate(
        &self,
        request: &SlideGenerationRequest,
    ) -> Result<GenerationAcceptedResponse> {
        let url = format!("{}/v1/slides/generate", self.base_url);
        let resp = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| Error::collaborator("slides", e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::collaborator(
                "slides",
                format!("{url} returned {status}: {body}"),
            ));
        }

        resp.json::<GenerationAcceptedResponse>()
            .await
            .map_err(|e| Error::collaborator("slides", e))
    }

    pub async fn status(&self, prompt_id: Uuid) -> Result<Option<GenerationStatusResponse>> {
        let url = format!("{}/v1/slides/{prompt_id}/status", self.base_url);
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::collaborator("slides", e))?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::collaborator(
                "slides",
                format!("{url} returned {status}: {body}"),
            ));
        }

        resp.json::<GenerationStatusResponse>()
            .await
            .map(Some)
            .map_err(|e| Error::collaborator("slides", e))
    }
}
