//! TTS and talking-head rendering clients.
//!
//! Both endpoints are GPU-bound and slow; both return large binary bodies
//! that are streamed straight to disk, never buffered whole. The worker owns
//! temp-file naming and the atomic rename; this module only fills the path
//! it is given.

use std::path::Path;

use futures_util::StreamExt;
use orpheus_domain::{Error, Result};
use reqwest::multipart::{Form, Part};
use tokio::io::AsyncWriteExt;

use crate::{CONNECT_TIMEOUT, LONG_READ_TIMEOUT};

/// Media rendering seam of the slide worker: audio first, then video.
#[async_trait::async_trait]
pub trait MediaRenderer: Send + Sync {
    /// Synthesize narration audio with the course's reference voice and
    /// write the WAV to `dest`. Returns the number of bytes written.
    async fn render_audio(&self, narration: &str, voice_sample: &Path, dest: &Path)
        -> Result<u64>;

    /// Render the talking-head video for a finished WAV and write the MP4
    /// stream to `dest` (the caller's temp path). Returns bytes written.
    async fn render_video(&self, audio: &Path, source_image: &Path, dest: &Path) -> Result<u64>;
}

#[derive(Debug, Clone)]
pub struct HttpMediaRenderer {
    http: reqwest::Client,
    tts_base_url: String,
    avatar_base_url: String,
}

impl HttpMediaRenderer {
    pub fn new(tts_base_url: &str, avatar_base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(LONG_READ_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| Error::collaborator("media", e))?;
        Ok(Self {
            http,
            tts_base_url: tts_base_url.trim_end_matches('/').to_owned(),
            avatar_base_url: avatar_base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Stream a successful response body into `dest`, fsyncing before close
    /// so a subsequent rename publishes complete bytes.
    async fn stream_to_file(resp: reqwest::Response, dest: &Path, service: &str) -> Result<u64> {
        let mut file = tokio::fs::File::create(dest).await?;
        let mut stream = resp.bytes_stream();
        let mut written = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| Error::collaborator(service, e))?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        file.sync_all().await?;
        Ok(written)
    }
}

#[async_trait::async_trait]
impl MediaRenderer for HttpMediaRenderer {
    async fn render_audio(
        &self,
        narration: &str,
        voice_sample: &Path,
        dest: &Path,
    ) -> Result<u64> {
        let url = format!("{}/v1/audio/generate", self.tts_base_url);

        let voice_bytes = tokio::fs::read(voice_sample).await?;
        let voice_name = voice_sample
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "voice.mp3".to_owned());
        let form = Form::new()
            .part(
                "voice_file",
                Part::bytes(voice_bytes)
                    .file_name(voice_name)
                    .mime_str("audio/mpeg")
                    .map_err(|e| Error::collaborator("tts", e))?,
            )
            .text("slide_text", narration.to_owned());

        let resp = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::collaborator("tts", e))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::collaborator(
                "tts",
                format!("{url} returned {status}: {body}"),
            ));
        }

        Self::stream_to_file(resp, dest, "tts").await
    }

    async fn render_video(&self, audio: &Path, source_image: &Path, dest: &Path) -> Result<u64> {
        let url = format!("{}/infer", self.avatar_base_url);

        let audio_bytes = tokio::fs::read(audio).await?;
        let image_bytes = tokio::fs::read(source_image).await?;
        let form = Form::new()
            .part(
                "audio",
                Part::bytes(audio_bytes)
                    .file_name("audio.wav")
                    .mime_str("audio/wav")
                    .map_err(|e| Error::collaborator("talking-head", e))?,
            )
            .part(
                "source",
                Part::bytes(image_bytes)
                    .file_name("image.png")
                    .mime_str("image/png")
                    .map_err(|e| Error::collaborator("talking-head", e))?,
            );

        let resp = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::collaborator("talking-head", e))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::collaborator(
                "talking-head",
                format!("{url} returned {status}: {body}"),
            ));
        }

        Self::stream_to_file(resp, dest, "talking-head").await
    }
}
