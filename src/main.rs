//! Deepdub - Automated Video Dubbing Workflow
//!
//! Entry point: parses arguments, sets up logging, loads configuration and
//! dispatches to the dubbing workflow.

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tracing_appender::{non_blocking, rolling};

use deepdub::cli::{Args, Commands};
use deepdub::config::Config;
use deepdub::speech::{cleanup_clips, CleanupOutcome};
use deepdub::subtitle::write_transcript;
use deepdub::translate::SUPPORTED_LANGUAGES;
use deepdub::workflow::{DubRequest, Workflow};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Setup logging to both console and file
    setup_logging(args.verbose)?;
    info!("Starting Deepdub - Automated Video Dubbing Workflow");

    // Load configuration
    let config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            // Try to load config.toml from current directory first
            if std::path::Path::new("config.toml").exists() {
                info!("Found config.toml in current directory, loading...");
                Config::from_file("config.toml")?
            } else {
                Config::default()
            }
        }
    };

    match args.command {
        Commands::Dub { input, language, voice_language, output, keep_clips } => {
            info!("Dubbing video file: {}", input.display());

            let request = DubRequest {
                input,
                target_language: language,
                voice_language,
                output,
                cleanup: !keep_clips,
            };

            let workflow = Workflow::new(config).await?;
            let report = workflow.run(&request).await?;

            println!("Dubbed {} words into {}", report.word_count, report.language_name);
            println!("> {}", report.output.display());
        }
        Commands::Transcribe { input, output } => {
            info!("Transcribing video: {}", input.display());

            let workflow = Workflow::new(config).await?;
            let transcript = workflow.transcribe_only(&input).await?;
            write_transcript(&transcript, &output).await?;

            println!("Wrote {} words to {}", transcript.len(), output.display());
        }
        Commands::Languages => {
            println!("{:<8} {:<30}", "Code", "Language");
            println!("{}", "-".repeat(38));
            for (code, name) in SUPPORTED_LANGUAGES {
                println!("{:<8} {:<30}", code, name);
            }
        }
        Commands::Cleanup => {
            match cleanup_clips(&config.speech.clip_dir).await? {
                CleanupOutcome::Removed(count) => {
                    println!("Deleted {} clips and {}", count, config.speech.clip_dir.display());
                }
                CleanupOutcome::NothingToClean => println!("No files to clean up."),
            }
        }
        Commands::InitConfig { output } => {
            config.save_to_file(&output)?;
            println!("Wrote configuration to {}", output.display());
        }
    }

    info!("Deepdub completed successfully");
    Ok(())
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    // Create log directory
    let log_dir = std::env::current_dir()?.join(".deepdub").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "deepdub.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false); // No ANSI colors in file

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Logging initialized - console: {}, file: {}",
          log_level, log_dir.join("deepdub.log").display());

    Ok(())
}
