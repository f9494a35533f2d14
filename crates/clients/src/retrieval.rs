//! Document-intelligence retrieval client.

use orpheus_domain::retrieval::DocumentChunk;
use orpheus_domain::{Error, Result};

use crate::{CONNECT_TIMEOUT, LONG_READ_TIMEOUT};

/// Context lookup seam of the pipeline's phase 2.
#[async_trait::async_trait]
pub trait ContextRetriever: Send + Sync {
    /// Retrieve course material matching one sub-query.
    async fn retrieve(&self, course_id: &str, query: &str) -> Result<DocumentChunk>;
}

#[derive(Debug, Clone)]
pub struct HttpRetrievalClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpRetrievalClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(LONG_READ_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| Error::collaborator("retrieval", e))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }
}

#[async_trait::async_trait]
impl ContextRetriever for HttpRetrievalClient {
    async fn retrieve(&self, course_id: &str, query: &str) -> Result<DocumentChunk> {
        let url = format!("{}/v1/retrieval/{course_id}", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(&[("promptQuery", query)])
            .send()
            .await
            .map_err(|e| Error::collaborator("retrieval", e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::collaborator(
                "retrieval",
                format!("{url} returned {status}: {body}"),
            ));
        }

        resp.json::<DocumentChunk>()
            .await
            .map_err(|e| Error::collaborator("retrieval", e))
    }
}
