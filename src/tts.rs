use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::{StatusCode, Url};
use tracing::debug;

use crate::error::SpeakError;
use crate::model::SynthesisQuery;

#[async_trait]
pub trait TtsService: std::fmt::Debug + Send + Sync {
    /// Synthesizes `query` and returns the encoded waveform.
    async fn synthesize(&self, query: &SynthesisQuery) -> Result<Bytes, SpeakError>;
}

/// Client for a TTS service that answers a JSON POST with a WAV body.
#[derive(Debug, Clone)]
pub struct HttpTts {
    client: reqwest::Client,
    url: Url,
    endpoint: String,
}

impl HttpTts {
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let url = Url::parse(url).with_context(|| format!("Invalid TTS url: {url}"))?;

        let host = url.host_str().context("TTS url has no host")?;
        let endpoint = match url.port_or_known_default() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };

        let client = reqwest::ClientBuilder::new()
            .timeout(timeout)
            .user_agent(concat!("speak-server/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            url,
            endpoint,
        })
    }

    /// `host:port` of the service, as reported when it cannot be reached.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn classify(&self, why: reqwest::Error) -> SpeakError {
        if why.is_connect() {
            SpeakError::ServiceUnreachable {
                endpoint: self.endpoint.clone(),
            }
        } else if why.is_timeout() {
            SpeakError::ServiceTimeout
        } else {
            SpeakError::Other(why.to_string())
        }
    }
}

#[async_trait]
impl TtsService for HttpTts {
    async fn synthesize(&self, query: &SynthesisQuery) -> Result<Bytes, SpeakError> {
        debug!(url = %self.url, speaker_id = query.speaker_id, "Posting synthesis query");

        let resp = self
            .client
            .post(self.url.clone())
            .header(CONTENT_TYPE, "application/json")
            .json(query)
            .send()
            .await
            .map_err(|why| self.classify(why))?;

        if resp.status() != StatusCode::OK {
            return Err(SpeakError::ServiceHttp(resp.status().as_u16()));
        }

        let audio = resp.bytes().await.map_err(|why| self.classify(why))?;

        debug!(bytes = audio.len(), "Received synthesized audio");

        Ok(audio)
    }
}
