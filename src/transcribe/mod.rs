// Speech-to-text
//
// The workflow only needs word-level timing, so every service is mapped
// into a `Transcript` of `WordSegment`s. Deepgram is the only backend.

pub mod deepgram;

use async_trait::async_trait;
use tracing::{debug, info};

pub use deepgram::DeepgramTranscriber;

use crate::config::TranscriberConfig;
use crate::error::Result;
use crate::media::VideoSource;
use crate::transcript::Transcript;

/// Main trait for transcription operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe raw media bytes into timed words
    async fn transcribe(&self, media: &[u8], mimetype: &str, language: &str) -> Result<Transcript>;
}

/// Factory for creating transcriber instances
pub struct TranscriberFactory;

impl TranscriberFactory {
    pub fn create_default(config: TranscriberConfig) -> Result<Box<dyn Transcriber>> {
        Ok(Box::new(DeepgramTranscriber::new(config)?))
    }
}

/// Transcribe stage: one request for the whole video
pub async fn transcribe_video(
    transcriber: &dyn Transcriber,
    source: &VideoSource,
    language: &str,
) -> Result<Transcript> {
    let media = source.read_bytes().await?;

    info!("Fetching word transcript for {} ({} bytes, {})",
          source.path().display(), media.len(), language);
    let transcript = transcriber.transcribe(&media, source.mimetype(), language).await?;

    info!("Transcription returned {} words", transcript.len());
    debug!("Transcript: {}", transcript.text());
    Ok(transcript)
}
