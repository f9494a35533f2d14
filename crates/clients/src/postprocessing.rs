//! Slide post-processor client: turns an assembled Markdown deck into a
//! hosted web/PDF distribution.

use orpheus_domain::{Error, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{CONNECT_TIMEOUT, LONG_READ_TIMEOUT};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Wire types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlidesetAsset {
    pub path: String,
    /// Base64-encoded payload.
    pub data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlidesetWithId {
    pub prompt_id: Uuid,
    /// The full deck as one Markdown document.
    pub slideset: String,
    #[serde(default)]
    pub assets: Vec<SlidesetAsset>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSlidesetRequest {
    pub theme: String,
    pub slideset: SlidesetWithId,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedUrls {
    pub web_url: String,
    pub pdf_url: String,
}

/// A previously persisted deck, as returned by the GET endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSlideset {
    pub prompt_id: Uuid,
    pub web_url: String,
    pub pdf_url: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait + HTTP impl
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Publishing seam of pipeline phase 6 and the slides status endpoint.
#[async_trait::async_trait]
pub trait SlidePublisher: Send + Sync {
    async fn store_slideset(&self, request: &StoreSlidesetRequest) -> Result<PublishedUrls>;

    /// `None` when the post-processor has never seen the prompt (typed 404).
    async fn get_slideset(&self, prompt_id: Uuid) -> Result<Option<StoredSlideset>>;
}

#[derive(Debug, Clone)]
pub struct HttpSlidePublisher {
    http: reqwest::Client,
    base_url: String,
}

impl HttpSlidePublisher {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(LONG_READ_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| Error::collaborator("postprocessing", e))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }
}

#[async_trait::async_trait]
impl SlidePublisher for HttpSlidePublisher {
    async fn store_slideset(&self, request: &StoreSlidesetRequest) -> Result<PublishedUrls> {
        let url = format!("{}/v1/postprocessing", self.base_url);
        let resp = self
            .http
            .put(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| Error::collaborator("postprocessing", e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::collaborator(
                "postprocessing",
                format!("{url} returned {status}: {body}"),
            ));
        }

        resp.json::<PublishedUrls>()
            .await
            .map_err(|e| Error::collaborator("postprocessing", e))
    }

    async fn get_slideset(&self, prompt_id: Uuid) -> Result<Option<StoredSlideset>> {
        let url = format!("{}/v1/postprocessing/{prompt_id}", self.base_url);
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::collaborator("postprocessing", e))?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::collaborator(
                "postprocessing",
                format!("{url} returned {status}: {body}"),
            ));
        }

        resp.json::<StoredSlideset>()
            .await
            .map(Some)
            .map_err(|e| Error::collaborator("postprocessing", e))
    }
}
