use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::error::{DubError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub transcriber: TranscriberConfig,
    pub translate: TranslateConfig,
    pub speech: SpeechConfig,
    pub media: MediaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriberConfig {
    /// Deepgram API base URL
    pub endpoint: String,
    /// API key; takes precedence over `api_key_env`
    pub api_key: Option<String>,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Recognition language sent with every request
    pub language: String,
    /// Ask the service to punctuate words
    pub punctuate: bool,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslateConfig {
    /// Google Translate base URL
    pub endpoint: String,
    /// Source language hint, `auto` lets the service detect it
    pub source_language: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Google Translate TTS base URL
    pub endpoint: String,
    /// Directory for per-word clips
    pub clip_dir: PathBuf,
    /// Longest text sent in a single TTS request
    pub max_chars: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Path to ffmpeg binary
    pub ffmpeg_path: String,
    /// Path to ffprobe binary
    pub ffprobe_path: String,
    /// Video encoder for the dubbed output
    pub video_codec: String,
    /// Audio encoder for the dubbed output
    pub audio_codec: String,
    /// Sample rate every clip is rendered at
    pub audio_sample_rate: u32,
    /// Additional encoding options appended before the output path
    /// Common options: ["-preset", "medium", "-crf", "23", "-pix_fmt", "yuv420p"]
    pub output_options: Vec<String>,
}

impl Default for TranscriberConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.deepgram.com".to_string(),
            api_key: None,
            api_key_env: "DEEPGRAM_KEY".to_string(),
            language: "en-US".to_string(),
            punctuate: true,
            timeout_secs: 300,
        }
    }
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://translate.googleapis.com".to_string(),
            source_language: "auto".to_string(),
            timeout_secs: 300,
        }
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://translate.google.com".to_string(),
            clip_dir: PathBuf::from("temp"),
            max_chars: 100,
            timeout_secs: 300,
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            audio_sample_rate: 44100,
            output_options: vec![
                // "-preset".to_string(), "medium".to_string(),
                // "-pix_fmt".to_string(), "yuv420p".to_string(),
            ],
        }
    }
}

impl TranscriberConfig {
    /// Resolve the API key from the config or the environment
    pub fn resolve_api_key(&self) -> Result<String> {
        if let Some(key) = self.api_key.as_ref().filter(|k| !k.trim().is_empty()) {
            return Ok(key.clone());
        }

        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(DubError::Config(format!(
                "No transcription API key: set `transcriber.api_key` or the {} environment variable",
                self.api_key_env
            ))),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DubError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| DubError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| DubError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| DubError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}
