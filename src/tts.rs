//! Audio narration through an OpenAI-compatible speech endpoint.
//!
//! Strictly post-digest and strictly optional: every failure here is logged
//! and absorbed by the caller — the digest file was already written and
//! stays valid without the audio link.

use futures::StreamExt;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

use crate::config::TtsConfig;

const MAX_AUDIO_SIZE: usize = 50 * 1024 * 1024; // 50MB

/// Env var consulted before the config file for the endpoint API key.
const API_KEY_ENV: &str = "SIFT_TTS_API_KEY";

/// Errors that can occur during audio synthesis. All non-fatal to the run.
#[derive(Debug, Error)]
pub enum TtsError {
    /// Audio was enabled but no endpoint URL is configured.
    #[error("No text-to-speech endpoint configured")]
    MissingEndpoint,
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Audio payload exceeded the size limit
    #[error("Audio response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    /// Writing the audio file failed
    #[error("Failed to write audio file: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    response_format: &'a str,
    speed: f32,
}

/// Sends the narration text to the speech endpoint and writes the returned
/// audio bytes to `out_path`.
///
/// One POST, one attempt. The Bearer header is only attached when a key is
/// configured (env var first, then config file).
pub async fn synthesize(
    client: &reqwest::Client,
    config: &TtsConfig,
    text: &str,
    out_path: &Path,
) -> Result<(), TtsError> {
    let endpoint = config
        .endpoint_url
        .as_deref()
        .ok_or(TtsError::MissingEndpoint)?;

    let request = SpeechRequest {
        model: &config.model,
        input: text,
        voice: &config.voice,
        response_format: &config.response_format,
        speed: config.speed,
    };

    let mut http_request = client.post(endpoint).json(&request);
    if let Some(key) = api_key(config) {
        http_request = http_request.header("Authorization", format!("Bearer {}", key.expose_secret()));
    }

    let response = http_request.send().await?;
    if !response.status().is_success() {
        return Err(TtsError::HttpStatus(response.status().as_u16()));
    }

    let bytes = read_limited_bytes(response, MAX_AUDIO_SIZE).await?;
    std::fs::write(out_path, &bytes)?;

    tracing::info!(
        path = %out_path.display(),
        bytes = bytes.len(),
        "Wrote audio narration"
    );
    Ok(())
}

fn api_key(config: &TtsConfig) -> Option<SecretString> {
    std::env::var(API_KEY_ENV)
        .ok()
        .filter(|key| !key.is_empty())
        .or_else(|| config.api_key.clone())
        .map(SecretString::from)
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, TtsError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(TtsError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(TtsError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(TtsError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
