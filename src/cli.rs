use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Dub a video into another language
    Dub {
        /// Input video file
        #[arg(short, long)]
        input: PathBuf,

        /// Target language code (see `languages`)
        #[arg(short, long)]
        language: String,

        /// Language of the synthesized voice
        #[arg(long, default_value = "en")]
        voice_language: String,

        /// Output video file
        #[arg(short, long, default_value = "output.mp4")]
        output: PathBuf,

        /// Keep the per-word clips after muxing
        #[arg(long)]
        keep_clips: bool,
    },

    /// Write the word-level transcript of a video (JSON, or SRT by extension)
    Transcribe {
        /// Input video file
        #[arg(short, long)]
        input: PathBuf,

        /// Output transcript file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// List supported target languages
    Languages,

    /// Delete the per-word clip directory
    Cleanup,

    /// Write the default configuration to a file
    InitConfig {
        /// Output configuration file
        #[arg(short, long, default_value = "config.toml")]
        output: PathBuf,
    },
}
