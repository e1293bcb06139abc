// Media handling for the dubbing workflow
//
// - Source: opening the input video and probing its frame rate
// - Commands: ffmpeg/ffprobe command builders
// - Processor: the ffmpeg-backed MediaProcessorTrait implementation

pub mod commands;
pub mod processor;
pub mod source;

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

pub use commands::*;
pub use processor::*;
pub use source::VideoSource;

use crate::config::MediaConfig;
use crate::error::{DubError, Result};
use crate::speech::ClipSet;
use crate::transcript::Transcript;

/// Main trait for media processing operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaProcessorTrait: Send + Sync {
    /// Frame rate of the first video stream
    async fn probe_frame_rate(&self, video_path: &Path) -> Result<f64>;

    /// Drop the original audio and mux the placed clips as the new track.
    /// Filter scripts and intermediate mixes are written to `work_dir`.
    async fn replace_audio(
        &self,
        video_path: &Path,
        placements: &[ClipPlacement],
        work_dir: &Path,
        output_path: &Path,
    ) -> Result<()>;

    /// Check if media processor is available
    async fn check_availability(&self) -> Result<()>;
}

/// Factory for creating media processor instances
pub struct MediaProcessorFactory;

impl MediaProcessorFactory {
    /// Create the default media processor implementation (FFmpeg-based)
    pub fn create_processor(config: MediaConfig) -> Box<dyn MediaProcessorTrait> {
        Box::new(processor::MediaProcessorImpl::new(config))
    }
}

/// Where one synthesized clip goes in the dubbed track
#[derive(Debug, Clone, PartialEq)]
pub struct ClipPlacement {
    pub index: usize,
    pub path: PathBuf,
    /// Offset into the video, seconds
    pub start: f64,
    /// `frame_rate * (start - end)`. Negative for any non-degenerate word.
    /// Reported only; clips are rendered at the configured sample rate.
    pub rate_scale: f64,
}

/// Pair every clip with its word's timing
pub fn plan_placements(
    transcript: &Transcript,
    clips: &ClipSet,
    frame_rate: f64,
) -> Result<Vec<ClipPlacement>> {
    if clips.len() != transcript.len() {
        return Err(DubError::SegmentMismatch {
            expected: transcript.len(),
            actual: clips.len(),
        });
    }

    let placements: Vec<ClipPlacement> = transcript.words
        .iter()
        .zip(clips.paths())
        .enumerate()
        .map(|(index, (word, path))| ClipPlacement {
            index,
            path: path.clone(),
            start: word.start,
            rate_scale: frame_rate * (word.start - word.end),
        })
        .collect();

    for placement in &placements {
        debug!("Clip {} at {:.3}s (rate scale {:.3})", placement.index, placement.start, placement.rate_scale);
    }

    Ok(placements)
}
