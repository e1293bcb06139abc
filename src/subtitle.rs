use std::path::Path;
use tokio::fs;
use tracing::info;

use crate::error::{DubError, Result};
use crate::transcript::Transcript;

/// Write a transcript to disk; `.srt` gets one cue per word, anything else is JSON
pub async fn write_transcript<P: AsRef<Path>>(
    transcript: &Transcript,
    output_path: P,
) -> Result<()> {
    let output_path = output_path.as_ref();
    let is_srt = output_path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("srt"));

    if is_srt {
        generate_srt(transcript, output_path).await
    } else {
        info!("Writing transcript JSON: {}", output_path.display());
        let content = serde_json::to_string_pretty(transcript)?;
        fs::write(output_path, content).await?;
        Ok(())
    }
}

/// Generate SRT subtitle file from a word transcript
pub async fn generate_srt<P: AsRef<Path>>(
    transcript: &Transcript,
    output_path: P,
) -> Result<()> {
    let output_path = output_path.as_ref();
    info!("Generating SRT file: {}", output_path.display());

    fs::write(output_path, render_srt(transcript)).await
        .map_err(DubError::Io)?;

    info!("SRT file generated with {} cues", transcript.len());
    Ok(())
}

fn render_srt(transcript: &Transcript) -> String {
    let mut srt_content = String::new();

    for (index, word) in transcript.words.iter().enumerate() {
        srt_content.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            index + 1,
            format_srt_time(word.start),
            format_srt_time(word.end),
            word.text.trim()
        ));
    }

    srt_content
}

/// Format time in seconds to SRT time format (HH:MM:SS,mmm)
fn format_srt_time(seconds: f64) -> String {
    let total_milliseconds = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_milliseconds / 3_600_000;
    let minutes = (total_milliseconds % 3_600_000) / 60_000;
    let secs = (total_milliseconds % 60_000) / 1_000;
    let millis = total_milliseconds % 1_000;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}
