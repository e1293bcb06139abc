// Deepgram pre-recorded transcription
// https://developers.deepgram.com/reference/listen-file

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::TranscriberConfig;
use crate::error::{DubError, Result};
use crate::transcript::{Transcript, WordSegment};
use super::Transcriber;

#[derive(Debug, Deserialize)]
pub struct DeepgramResponse {
    pub results: DeepgramResults,
}

#[derive(Debug, Deserialize)]
pub struct DeepgramResults {
    pub channels: Vec<DeepgramChannel>,
}

#[derive(Debug, Deserialize)]
pub struct DeepgramChannel {
    pub alternatives: Vec<DeepgramAlternative>,
}

#[derive(Debug, Deserialize)]
pub struct DeepgramAlternative {
    #[serde(default)]
    pub words: Vec<DeepgramWord>,
}

#[derive(Debug, Deserialize)]
pub struct DeepgramWord {
    pub word: String,
    pub start: f64,
    pub end: f64,
}

impl DeepgramResponse {
    /// Words of the first alternative of the first channel, tagged with
    /// the language that was requested
    pub fn into_transcript(self, language: &str) -> Result<Transcript> {
        let channel = self.results.channels
            .into_iter()
            .next()
            .ok_or_else(|| DubError::Transcription("Response contains no channels".to_string()))?;

        let alternative = channel.alternatives
            .into_iter()
            .next()
            .ok_or_else(|| DubError::Transcription("Response contains no alternatives".to_string()))?;

        let words = alternative.words
            .into_iter()
            .map(|w| WordSegment::new(w.word, w.start, w.end))
            .collect();

        Ok(Transcript::new(language, words))
    }
}

pub struct DeepgramTranscriber {
    client: Client,
    config: TranscriberConfig,
    api_key: String,
}

impl DeepgramTranscriber {
    pub fn new(config: TranscriberConfig) -> Result<Self> {
        let api_key = config.resolve_api_key()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("deepdub/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, config, api_key })
    }
}

#[async_trait]
impl Transcriber for DeepgramTranscriber {
    async fn transcribe(&self, media: &[u8], mimetype: &str, language: &str) -> Result<Transcript> {
        let url = format!("{}/v1/listen", self.config.endpoint.trim_end_matches('/'));
        info!("Fetching the video transcript from Deepgram");
        debug!("Sending transcription request to: {}", url);

        let response = self.client
            .post(&url)
            .query(&[
                ("punctuate", self.config.punctuate.to_string()),
                ("language", language.to_string()),
            ])
            .header(AUTHORIZATION, format!("Token {}", self.api_key))
            .header(CONTENT_TYPE, mimetype)
            .body(media.to_vec())
            .send()
            .await
            .map_err(|e| DubError::Transcription(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(DubError::Transcription(format!(
                "Deepgram API error {}: {}", status, error_text
            )));
        }

        let body: DeepgramResponse = response.json().await
            .map_err(|e| DubError::Transcription(format!("Failed to parse response: {}", e)))?;

        body.into_transcript(language)
    }
}
