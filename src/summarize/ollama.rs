use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from the Ollama backend.
///
/// `ModelNotFound` is the one kind the provisioner acts on; everything else
/// from the availability probe is fatal to the run. The pipeline branches on
/// these variants — never on response text.
#[derive(Debug, Error)]
pub enum OllamaError {
    /// Network-level error (connection refused, DNS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// The backend does not have the requested model (HTTP 404 on chat).
    #[error("Model '{0}' not found on the backend")]
    ModelNotFound(String),
    /// Any other non-2xx backend response.
    #[error("Backend error: status {status}: {message}")]
    Api { status: u16, message: String },
    /// The response body did not match the expected shape.
    #[error("Malformed backend response: {0}")]
    InvalidResponse(String),
    /// The model returned nothing usable after cleanup.
    #[error("Backend returned an empty summary")]
    EmptyResponse,
}

/// Client for an Ollama-compatible chat backend.
///
/// Holds the shared HTTP client, the base URL, and the model name every
/// call is issued against. No request timeout is applied here — the feed
/// fetch is the only configured timeout boundary in the run.
pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[derive(Serialize)]
struct PullRequest<'a> {
    model: &'a str,
    stream: bool,
}

impl OllamaClient {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Issues one chat call and returns the raw assistant message.
    pub async fn chat(&self, prompt: &str) -> Result<String, OllamaError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            stream: false,
        };

        let response = self
            .http
            .post(format!("{}/api/chat", self.base_url))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(OllamaError::ModelNotFound(self.model.clone()));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(OllamaError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| OllamaError::InvalidResponse(e.to_string()))?;
        Ok(body.message.content)
    }

    /// Asks the backend to pull the configured model.
    pub async fn pull(&self) -> Result<(), OllamaError> {
        let request = PullRequest {
            model: &self.model,
            stream: false,
        };

        let response = self
            .http
            .post(format!("{}/api/pull", self.base_url))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(OllamaError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }

    /// Verifies the configured model is callable, pulling it on demand.
    ///
    /// Issues a minimal probe chat. A typed `ModelNotFound` triggers one
    /// pull attempt; the error is re-raised only if the pull itself fails.
    /// Any other probe error is returned as-is. Runs exactly once per run,
    /// before any feed is processed — a failure here aborts the whole run.
    pub async fn ensure_available(&self) -> Result<(), OllamaError> {
        match self.chat("Test").await {
            Ok(_) => Ok(()),
            Err(OllamaError::ModelNotFound(_)) => {
                tracing::warn!(model = %self.model, "Model not found, attempting to pull");
                self.pull().await?;
                tracing::info!(model = %self.model, "Successfully pulled model");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}
