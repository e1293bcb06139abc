// Text-to-speech for translated words
//
// - Gtts: the Google Translate TTS backend
// - Clips: the on-disk clip set and its cleanup

pub mod clips;
pub mod gtts;

use async_trait::async_trait;
use std::path::Path;
use tokio::fs;
use tracing::{info, debug};

pub use clips::{cleanup_clips, clip_path, ClipSet, CleanupOutcome};
pub use gtts::GoogleTtsSynthesizer;

use crate::config::SpeechConfig;
use crate::error::Result;
use crate::progress::word_progress;
use crate::transcript::Transcript;

/// Main trait for speech synthesis operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Speak `text` in `language`, returning encoded audio
    async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>>;
}

/// Factory for creating synthesizer instances
pub struct SpeechSynthesizerFactory;

impl SpeechSynthesizerFactory {
    pub fn create_default(config: SpeechConfig) -> Result<Box<dyn SpeechSynthesizer>> {
        Ok(Box::new(GoogleTtsSynthesizer::new(config)?))
    }
}

/// Synthesize stage: one clip per word, written as `<index>.mp3`, in order
pub async fn synthesize_transcript(
    synthesizer: &dyn SpeechSynthesizer,
    transcript: &Transcript,
    voice_language: &str,
    clip_dir: &Path,
) -> Result<ClipSet> {
    info!("Converting {} words into speech ({})", transcript.len(), voice_language);
    fs::create_dir_all(clip_dir).await?;

    let pb = word_progress(transcript.len(), "Synthesizing");
    let mut paths = Vec::with_capacity(transcript.len());

    for (index, word) in transcript.words.iter().enumerate() {
        let audio = synthesizer.synthesize(&word.text, voice_language).await?;
        let path = clip_path(clip_dir, index);
        fs::write(&path, &audio).await?;
        debug!("Wrote {} ({} bytes) for '{}'", path.display(), audio.len(), word.text);
        paths.push(path);
        pb.inc(1);
    }
    pb.finish_and_clear();

    info!("Converted the words into {} clips in {}", paths.len(), clip_dir.display());
    Ok(ClipSet::new(clip_dir, paths))
}
