use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::config::SpeechConfig;
use crate::error::{DubError, Result};
use super::SpeechSynthesizer;

/// Google Translate text-to-speech; returns MP3 bytes
pub struct GoogleTtsSynthesizer {
    client: Client,
    config: SpeechConfig,
}

impl GoogleTtsSynthesizer {
    pub fn new(config: SpeechConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("deepdub/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, config })
    }

    async fn fetch_chunk(&self, chunk: &str, language: &str, idx: usize, total: usize) -> Result<Vec<u8>> {
        let url = format!("{}/translate_tts", self.config.endpoint.trim_end_matches('/'));
        debug!("Requesting speech chunk {}/{} from {}", idx + 1, total, url);

        let textlen = chunk.chars().count().to_string();
        let idx = idx.to_string();
        let total = total.to_string();

        let response = self.client
            .get(&url)
            .query(&[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", language),
                ("q", chunk),
                ("textlen", textlen.as_str()),
                ("idx", idx.as_str()),
                ("total", total.as_str()),
            ])
            .send()
            .await
            .map_err(|e| DubError::Synthesis(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(DubError::Synthesis(format!(
                "Google TTS error {}: {}", status, error_text
            )));
        }

        let bytes = response.bytes().await
            .map_err(|e| DubError::Synthesis(format!("Failed to read audio: {}", e)))?;
        if bytes.is_empty() {
            return Err(DubError::Synthesis("Empty audio received".to_string()));
        }

        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleTtsSynthesizer {
    async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>> {
        let chunks = split_text(text, self.config.max_chars);
        if chunks.is_empty() {
            return Err(DubError::Synthesis("No text to speak".to_string()));
        }

        // MP3 frames are self-delimiting, so parts can be appended as-is
        let mut audio = Vec::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            audio.extend(self.fetch_chunk(chunk, language, idx, chunks.len()).await?);
        }

        Ok(audio)
    }
}

/// Split on whitespace into pieces of at most `max_chars` characters.
/// A single token longer than the limit is cut at character boundaries.
pub fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();

    for token in text.split_whitespace() {
        let mut token: Vec<char> = token.chars().collect();

        while token.len() > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            let rest = token.split_off(max_chars);
            chunks.push(token.into_iter().collect());
            token = rest;
        }

        let token: String = token.into_iter().collect();
        let needed = if current.is_empty() {
            token.chars().count()
        } else {
            current.chars().count() + 1 + token.chars().count()
        };

        if needed > max_chars && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&token);
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}
