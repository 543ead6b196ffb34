//! The single-run pipeline: registry → fetch → extract → summarize →
//! digest → registry rewrite → optional audio.
//!
//! Feeds and articles are processed strictly sequentially in source order.
//! Failure handling is tiered (see the crate docs): fetch/extraction
//! failures quarantine a feed, summarization failures skip an article,
//! audio failures are absorbed after the digest is safely on disk. Only
//! registry loading and model provisioning abort the run, and both happen
//! before anything is written.

use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use tracing::{info, warn};

use crate::config::Config;
use crate::digest::{self, DigestEntry, RunReport};
use crate::feed;
use crate::registry;
use crate::summarize::{self, OllamaClient};
use crate::tts;

/// What a completed run produced, for the caller's final log lines.
#[derive(Debug)]
pub struct RunOutcome {
    pub digest_path: PathBuf,
    pub summarized: usize,
    pub quarantined: usize,
    pub audio_path: Option<PathBuf>,
}

/// Executes one full digest run.
///
/// # Errors
///
/// Only run-fatal conditions: a missing/empty feed list, an unrecoverable
/// model-provisioning failure, or an I/O failure writing the digest or the
/// registry. Per-feed and per-article failures never surface here.
pub async fn run(config: &Config, skip_audio: bool) -> Result<RunOutcome> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("sift/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")?;

    let feeds = registry::load_active(&config.feeds_file)?;
    info!(feeds = feeds.len(), "Loaded active feed list");

    let ollama = OllamaClient::new(
        client.clone(),
        config.ollama.base_url(),
        config.ollama.model.clone(),
    );
    ollama
        .ensure_available()
        .await
        .context("Failed to ensure model availability")?;

    let timeout = Duration::from_secs(config.feed_timeout);
    let mut entries: Vec<DigestEntry> = Vec::new();
    let mut quarantined: HashSet<String> = HashSet::new();

    for url in &feeds {
        info!(url = %url, "Processing feed");

        let articles = match feed::fetch_feed(&client, url, timeout).await {
            Ok(raw) => feed::extract(raw, config.num_articles),
            Err(e) if e.is_timeout() => {
                info!(url = %url, error = %e, "Feed fetch timed out");
                Vec::new()
            }
            Err(e) => {
                warn!(url = %url, error = %e, "Feed fetch failed");
                Vec::new()
            }
        };

        if articles.is_empty() {
            warn!(url = %url, "No valid content found, quarantining feed");
            quarantined.insert(url.clone());
            continue;
        }

        for article in articles {
            match summarize::summarize(&ollama, &article.content).await {
                Ok(summary) => entries.push(DigestEntry {
                    heading: article.title,
                    body: summary,
                    link: article.link,
                }),
                Err(e) => {
                    warn!(title = %article.title, error = %e, "Failed to summarize article");
                }
            }
        }
    }

    let (active, removed) = registry::partition(&feeds, &quarantined);

    let audio_enabled = config.text_to_speech.enabled && !skip_audio;
    let mut report = RunReport {
        date: Local::now().date_naive(),
        entries,
        quarantined: removed.clone(),
        narration: None,
    };
    if audio_enabled {
        report.narration = Some(digest::render_narration(&report.entries));
    }

    let digest_path = config
        .output_folder
        .join(format!("{}.md", report.file_stem()));
    std::fs::write(&digest_path, digest::render_markdown(&report))
        .with_context(|| format!("Failed to write digest to '{}'", digest_path.display()))?;
    info!(
        path = %digest_path.display(),
        entries = report.entries.len(),
        "Wrote digest"
    );

    registry::persist(&config.feeds_file, &config.removed_feeds_file, &active, &removed)?;

    let mut audio_path = None;
    if let Some(narration) = &report.narration {
        let path = config.output_folder.join(format!(
            "{}.{}",
            report.file_stem(),
            config.text_to_speech.response_format
        ));
        match tts::synthesize(&client, &config.text_to_speech, narration, &path).await {
            Ok(()) => {
                if let Err(e) = append_audio_link(&digest_path, &path) {
                    warn!(error = %e, "Failed to append audio link to digest");
                }
                audio_path = Some(path);
            }
            Err(e) => {
                warn!(error = %e, "Audio narration failed, digest is unaffected");
            }
        }
    }

    Ok(RunOutcome {
        digest_path,
        summarized: report.entries.len(),
        quarantined: report.quarantined.len(),
        audio_path,
    })
}

/// Appends a markdown link to the audio artifact at the end of the digest.
fn append_audio_link(digest_path: &Path, audio_path: &Path) -> std::io::Result<()> {
    let file_name = audio_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| audio_path.display().to_string());

    let mut file = std::fs::OpenOptions::new().append(true).open(digest_path)?;
    writeln!(file, "[Audio version]({file_name})")?;
    Ok(())
}
