use feed_rs::parser;
use futures::StreamExt;
use std::time::Duration;
use thiserror::Error;
use url::Url;

const MAX_FEED_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Errors that can occur during a feed fetch.
///
/// Every variant is a soft failure from the pipeline's point of view: the
/// feed yields zero articles this run and the loop moves on. The variants
/// exist so the caller can log timeouts quieter than outright failures.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The feed URL could not be parsed.
    #[error("Invalid feed URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The feed URL uses a scheme other than http or https.
    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),
    /// The request exceeded the configured per-feed timeout.
    #[error("Request timed out after {0}s")]
    Timeout(u64),
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Response body exceeded the size limit
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    /// Payload could not be parsed as RSS or Atom
    #[error("Parse error: {0}")]
    Parse(String),
}

impl FetchError {
    /// Timeouts are expected transient noise and logged at info level;
    /// everything else warrants a warning.
    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Timeout(_))
    }
}

/// Fetches and parses one feed.
///
/// Single attempt, no retry, no backoff — an unreachable feed costs the run
/// at most `timeout`. The timeout bounds the request send; the body read is
/// bounded by the 10MB size cap instead.
///
/// # Errors
///
/// See [`FetchError`]. All of them are absorbed by the caller as "this feed
/// produced nothing this run".
pub async fn fetch_feed(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
) -> Result<feed_rs::model::Feed, FetchError> {
    let parsed = Url::parse(url)?;
    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(FetchError::UnsupportedScheme(scheme.to_owned())),
    }

    let response = tokio::time::timeout(timeout, client.get(parsed).send())
        .await
        .map_err(|_| FetchError::Timeout(timeout.as_secs()))?
        .map_err(FetchError::Network)?;

    if !response.status().is_success() {
        return Err(FetchError::HttpStatus(response.status().as_u16()));
    }

    let bytes = read_limited_bytes(response, MAX_FEED_SIZE).await?;

    let feed =
        parser::parse(bytes.as_slice()).map_err(|e| FetchError::Parse(e.to_string()))?;

    tracing::debug!(url = %url, entries = feed.entries.len(), "Fetched feed");
    Ok(feed)
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(FetchError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(FetchError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
