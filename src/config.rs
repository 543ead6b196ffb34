//! Configuration file parser for the sift config.toml.
//!
//! The config file is optional — a missing file yields `Config::default()`.
//! Unknown keys are silently ignored by serde (with `deny_unknown_fields`
//! off), though we log a warning when the file contains potential typos.
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),
}

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
/// Missing keys fall back to `Default::default()`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Newline-delimited list of active feed URLs.
    pub feeds_file: PathBuf,

    /// Destination for feeds quarantined during a run.
    pub removed_feeds_file: PathBuf,

    /// Directory the digest (and optional audio file) is written to.
    pub output_folder: PathBuf,

    /// Maximum number of entries taken from each feed.
    pub num_articles: usize,

    /// Per-feed fetch timeout in seconds.
    pub feed_timeout: u64,

    /// Summarization backend settings.
    pub ollama: OllamaConfig,

    /// Optional audio narration settings.
    pub text_to_speech: TtsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feeds_file: PathBuf::from("feeds.txt"),
            removed_feeds_file: PathBuf::from("removed_feeds.txt"),
            output_folder: PathBuf::from("out"),
            num_articles: 5,
            feed_timeout: 30,
            ollama: OllamaConfig::default(),
            text_to_speech: TtsConfig::default(),
        }
    }
}

/// Connection settings for the Ollama summarization backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub host: String,
    pub port: u16,
    /// Model name passed to every chat call, pulled on demand when missing.
    pub model: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 11434,
            model: "llama3.2".to_string(),
        }
    }
}

impl OllamaConfig {
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Text-to-speech settings for the optional audio narration.
///
/// Custom Debug impl masks `api_key` to prevent secret leakage in logs,
/// error messages, and debug output.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct TtsConfig {
    /// Whether to synthesize an audio narration after the digest is written.
    pub enabled: bool,

    /// Speech endpoint URL. Required when `enabled` is true.
    pub endpoint_url: Option<String>,

    pub model: String,
    pub voice: String,

    /// Audio container format; also used as the output file extension.
    pub response_format: String,

    pub speed: f32,

    /// API key for the speech endpoint (alternative to SIFT_TTS_API_KEY env
    /// var). Env var takes precedence over config file.
    pub api_key: Option<String>,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint_url: None,
            model: "tts-1".to_string(),
            voice: "alloy".to_string(),
            response_format: "mp3".to_string(),
            speed: 1.0,
            api_key: None,
        }
    }
}

/// Mask api_key in Debug output to prevent secret leakage.
impl std::fmt::Debug for TtsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtsConfig")
            .field("enabled", &self.enabled)
            .field("endpoint_url", &self.endpoint_url)
            .field("model", &self.model)
            .field("voice", &self.voice)
            .field("response_format", &self.response_format)
            .field("speed", &self.speed)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → silently accepted (serde default behavior), logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        // Check file size before reading so a corrupted or maliciously large
        // config cannot exhaust memory.
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {} // Size is within limits, proceed
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Race condition: file deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        // Parse the TOML content first as a raw table to detect unknown keys
        if let Ok(raw) = content.parse::<toml::Table>() {
            let known_keys = [
                "feeds_file",
                "removed_feeds_file",
                "output_folder",
                "num_articles",
                "feed_timeout",
                "ollama",
                "text_to_speech",
            ];
            for key in raw.keys() {
                if !known_keys.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(
            path = %path.display(),
            feeds_file = %config.feeds_file.display(),
            model = %config.ollama.model,
            "Loaded configuration"
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.feeds_file, PathBuf::from("feeds.txt"));
        assert_eq!(config.removed_feeds_file, PathBuf::from("removed_feeds.txt"));
        assert_eq!(config.output_folder, PathBuf::from("out"));
        assert_eq!(config.num_articles, 5);
        assert_eq!(config.feed_timeout, 30);
        assert_eq!(config.ollama.port, 11434);
        assert!(!config.text_to_speech.enabled);
        assert!(config.text_to_speech.api_key.is_none());
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/sift_test_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config.num_articles, 5);
    }

    #[test]
    fn test_empty_file_returns_default() {
        let dir = std::env::temp_dir().join("sift_config_test_empty");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.feed_timeout, 30);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_partial_config_uses_defaults_for_missing() {
        let dir = std::env::temp_dir().join("sift_config_test_partial");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "num_articles = 3\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.num_articles, 3);
        assert_eq!(config.feed_timeout, 30); // default
        assert_eq!(config.ollama.model, "llama3.2"); // default

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_full_config() {
        let dir = std::env::temp_dir().join("sift_config_test_full");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");

        let content = r#"
feeds_file = "my_feeds.txt"
removed_feeds_file = "dead_feeds.txt"
output_folder = "digests"
num_articles = 10
feed_timeout = 15

[ollama]
host = "ollama.local"
port = 11500
model = "mistral"

[text_to_speech]
enabled = true
endpoint_url = "https://tts.example.com/v1/audio/speech"
model = "tts-1-hd"
voice = "nova"
response_format = "opus"
speed = 1.25
api_key = "test-key-123"
"#;
        std::fs::write(&path, content).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.feeds_file, PathBuf::from("my_feeds.txt"));
        assert_eq!(config.removed_feeds_file, PathBuf::from("dead_feeds.txt"));
        assert_eq!(config.output_folder, PathBuf::from("digests"));
        assert_eq!(config.num_articles, 10);
        assert_eq!(config.feed_timeout, 15);
        assert_eq!(config.ollama.base_url(), "http://ollama.local:11500");
        assert_eq!(config.ollama.model, "mistral");
        assert!(config.text_to_speech.enabled);
        assert_eq!(
            config.text_to_speech.endpoint_url.as_deref(),
            Some("https://tts.example.com/v1/audio/speech")
        );
        assert_eq!(config.text_to_speech.voice, "nova");
        assert_eq!(config.text_to_speech.response_format, "opus");
        assert_eq!(config.text_to_speech.speed, 1.25);
        assert_eq!(config.text_to_speech.api_key.as_deref(), Some("test-key-123"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let dir = std::env::temp_dir().join("sift_config_test_invalid");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "this is not [valid toml").unwrap();

        let result = Config::load(&path);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let dir = std::env::temp_dir().join("sift_config_test_unknown");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");

        let content = r#"
num_articles = 7
totally_fake_key = "should not fail"
"#;
        std::fs::write(&path, content).unwrap();

        // Should succeed (unknown keys ignored)
        let config = Config::load(&path).unwrap();
        assert_eq!(config.num_articles, 7);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_wrong_type_returns_error() {
        let dir = std::env::temp_dir().join("sift_config_test_wrongtype");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        // num_articles should be an integer, not a string
        std::fs::write(&path, "num_articles = \"five\"\n").unwrap();

        let result = Config::load(&path);
        assert!(result.is_err());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_too_large_file_rejected() {
        let dir = std::env::temp_dir().join("sift_config_test_too_large");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");

        // Write a file just over 1MB
        let content = "a".repeat(1_048_577);
        std::fs::write(&path, content).unwrap();

        let result = Config::load(&path);
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), ConfigError::TooLarge(_)));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_debug_masks_api_key() {
        let mut config = TtsConfig::default();
        config.api_key = Some("super-secret-key-12345".to_string());

        let debug_output = format!("{:?}", config);
        assert!(
            !debug_output.contains("super-secret-key-12345"),
            "Debug output should not contain the API key"
        );
        assert!(
            debug_output.contains("[REDACTED]"),
            "Debug output should show [REDACTED] for API key"
        );
    }

    #[test]
    fn test_debug_shows_none_when_no_api_key() {
        let config = TtsConfig::default();
        let debug_output = format!("{:?}", config);
        assert!(debug_output.contains("None"));
        assert!(!debug_output.contains("[REDACTED]"));
    }
}
