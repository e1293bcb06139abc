//! Deepdub - Automated Video Dubbing Workflow
//!
//! Dubs a video into another language: word-level transcription with
//! Deepgram, word-by-word translation and speech synthesis with Google
//! Translate, and muxing with ffmpeg.

pub mod cli;
pub mod config;
pub mod workflow;
pub mod transcript;
pub mod transcribe;
pub mod translate;
pub mod speech;
pub mod subtitle;
pub mod media;
pub mod progress;
pub mod error;
