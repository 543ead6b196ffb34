use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use sift::config::Config;
use sift::pipeline;

#[derive(Parser, Debug)]
#[command(
    name = "sift",
    about = "Daily RSS/Atom digest generator with LLM summaries",
    version
)]
struct Args {
    /// Path to the configuration file
    #[arg(long, default_value = "config.toml", value_name = "FILE")]
    config: PathBuf,

    /// Skip audio narration even when enabled in the configuration
    #[arg(long)]
    no_audio: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = Config::load(&args.config)?;

    std::fs::create_dir_all(&config.output_folder).with_context(|| {
        format!(
            "Failed to create output folder '{}'",
            config.output_folder.display()
        )
    })?;

    // A Ctrl-C mid-run terminates immediately with a clean status; files
    // already written stay as written, nothing is rolled back.
    tokio::select! {
        result = pipeline::run(&config, args.no_audio) => {
            let outcome = result?;
            tracing::info!(
                path = %outcome.digest_path.display(),
                articles = outcome.summarized,
                "Run complete"
            );
            if outcome.quarantined > 0 {
                tracing::info!(
                    feeds = outcome.quarantined,
                    "Removed feeds due to lack of content"
                );
            }
            if let Some(audio) = outcome.audio_path {
                tracing::info!(path = %audio.display(), "Audio narration available");
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted, exiting");
        }
    }

    Ok(())
}
