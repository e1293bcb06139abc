use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{DubError, Result};
use super::MediaProcessorTrait;

/// A local video file that has been checked to exist and be readable
#[derive(Debug, Clone)]
pub struct VideoSource {
    path: PathBuf,
}

impl VideoSource {
    /// Open a video file. Only touches the filesystem.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let metadata = std::fs::metadata(path)
            .map_err(|_| DubError::VideoNotFound(path.display().to_string()))?;
        if !metadata.is_file() {
            return Err(DubError::VideoNotFound(path.display().to_string()));
        }
        std::fs::File::open(path)
            .map_err(|e| DubError::VideoNotFound(format!("{} ({})", path.display(), e)))?;

        info!("Using video path: {}", path.display());
        Ok(Self { path: path.to_path_buf() })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Mime type sent to the transcription service
    pub fn mimetype(&self) -> &'static str {
        let ext = self.path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("mov") => "video/quicktime",
            Some("mkv") => "video/x-matroska",
            Some("webm") => "video/webm",
            Some("avi") => "video/x-msvideo",
            _ => "video/mp4",
        }
    }

    pub async fn read_bytes(&self) -> Result<Vec<u8>> {
        Ok(tokio::fs::read(&self.path).await?)
    }

    pub async fn frame_rate(&self, media: &dyn MediaProcessorTrait) -> Result<f64> {
        media.probe_frame_rate(&self.path).await
    }
}
