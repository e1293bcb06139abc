use async_trait::async_trait;
use std::path::Path;
use tracing::{info, debug};

use crate::config::MediaConfig;
use crate::error::{DubError, Result};
use super::{ClipPlacement, MediaProcessorTrait, MediaCommandBuilder, ReplaceAudioOptions};

/// Concrete implementation of media processor (FFmpeg-based)
pub struct MediaProcessorImpl {
    config: MediaConfig,
    command_builder: MediaCommandBuilder,
}

impl MediaProcessorImpl {
    /// Create a new media processor implementation
    pub fn new(config: MediaConfig) -> Self {
        let command_builder = MediaCommandBuilder::new(&config.ffmpeg_path, &config.ffprobe_path);

        Self {
            config,
            command_builder,
        }
    }
}

#[async_trait]
impl MediaProcessorTrait for MediaProcessorImpl {
    async fn probe_frame_rate(&self, video_path: &Path) -> Result<f64> {
        debug!("Probing frame rate of {}", video_path.display());

        let raw = self.command_builder
            .probe_frame_rate(video_path)
            .execute_with_output()
            .await?;

        let frame_rate = parse_frame_rate(&raw)?;
        info!("Frame rate of {}: {:.3} fps", video_path.display(), frame_rate);
        Ok(frame_rate)
    }

    async fn replace_audio(
        &self,
        video_path: &Path,
        placements: &[ClipPlacement],
        work_dir: &Path,
        output_path: &Path,
    ) -> Result<()> {
        info!("Replacing audio of {} with {} clips -> {}",
              video_path.display(), placements.len(), output_path.display());

        let options = ReplaceAudioOptions {
            video_codec: &self.config.video_codec,
            audio_codec: &self.config.audio_codec,
            sample_rate: self.config.audio_sample_rate,
            extra: &self.config.output_options,
        };

        let steps = self.command_builder.replace_audio(video_path, placements, work_dir, output_path, &options);
        if steps.iter().any(|step| step.script.is_some()) {
            tokio::fs::create_dir_all(work_dir).await?;
        }

        let total = steps.len();
        for (i, step) in steps.into_iter().enumerate() {
            if let Some((script_path, graph)) = &step.script {
                tokio::fs::write(script_path, graph).await?;
            }
            debug!("Mux pass {}/{}: {}", i + 1, total, step.command.description);
            step.command.execute().await?;
        }

        info!("Audio replacement completed");
        Ok(())
    }

    async fn check_availability(&self) -> Result<()> {
        let output = self.command_builder
            .version_check()
            .execute_with_output()
            .await
            .map_err(|e| DubError::Media(format!("Media processor not available: {}", e)))?;

        info!("Media processor is available: {}", output.lines().next().unwrap_or("unknown version"));
        Ok(())
    }
}

/// Parse ffprobe's `r_frame_rate`, e.g. `30000/1001` or `25/1`
pub fn parse_frame_rate(raw: &str) -> Result<f64> {
    let raw = raw.lines().next().unwrap_or("").trim();
    let invalid = || DubError::Media(format!("Invalid frame rate: '{}'", raw));

    let rate = match raw.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().map_err(|_| invalid())?;
            let den: f64 = den.trim().parse().map_err(|_| invalid())?;
            if den == 0.0 {
                return Err(invalid());
            }
            num / den
        }
        None => raw.parse().map_err(|_| invalid())?,
    };

    if rate.is_finite() && rate > 0.0 {
        Ok(rate)
    } else {
        Err(invalid())
    }
}
