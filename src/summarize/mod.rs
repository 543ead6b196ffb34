//! Article summarization through an Ollama chat backend.
//!
//! One prompt, one call, one attempt — a failed or empty response fails
//! that single article and nothing else. Retry logic is deliberately
//! absent; the digest simply goes out without the article.

mod ollama;

pub use ollama::{OllamaClient, OllamaError};

/// Summarizes one article body into 1-2 sentences.
///
/// The raw model response is post-processed by dropping blank lines and
/// rejoining — models that echo extra blank formatting are tolerated, but
/// no semantic correction is attempted. A response that is empty after
/// cleanup is an error.
///
/// # Errors
///
/// Any [`OllamaError`]; the caller logs the article title and skips it.
pub async fn summarize(client: &OllamaClient, content: &str) -> Result<String, OllamaError> {
    let raw = client.chat(&build_prompt(content)).await?;
    let summary = clean_summary(&raw);
    if summary.is_empty() {
        return Err(OllamaError::EmptyResponse);
    }
    Ok(summary)
}

fn build_prompt(content: &str) -> String {
    format!(
        "## INSTRUCTION\n\n\
         Respond with 1-2 sentences that summarize the key message of this article:\n\n\
         ## ARTICLE\n\n\
         {content}\n\n\
         ## RULES\n\n\
         - DO NOT INCLUDE ANYTHING OTHER THAN THE SUMMARY IN YOUR RESPONSE\n\
         - DO NOT ADD ANY TEXT BEFORE OR AFTER THE SUMMARY\n\
         - ONLY RESPOND WITH THE ARTICLE SUMMARY\n"
    )
}

/// Remove empty lines and surrounding whitespace from a model response.
fn clean_summary(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn chat_body(content: &str) -> serde_json::Value {
        json!({ "message": { "role": "assistant", "content": content } })
    }

    fn client_for(server: &MockServer) -> OllamaClient {
        OllamaClient::new(reqwest::Client::new(), server.uri(), "test-model")
    }

    #[test]
    fn test_prompt_embeds_article() {
        let prompt = build_prompt("the article body");
        assert!(prompt.contains("## ARTICLE"));
        assert!(prompt.contains("the article body"));
        assert!(prompt.contains("1-2 sentences"));
    }

    #[test]
    fn test_clean_summary_drops_blank_lines() {
        assert_eq!(
            clean_summary("\n  First sentence.  \n\n\nSecond sentence.\n"),
            "First sentence.\nSecond sentence."
        );
    }

    #[test]
    fn test_clean_summary_of_whitespace_is_empty() {
        assert_eq!(clean_summary("  \n \n"), "");
    }

    #[tokio::test]
    async fn test_summarize_success() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(chat_body("\nA tidy summary.\n\n")),
            )
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let summary = summarize(&client, "some article text").await.unwrap();
        assert_eq!(summary, "A tidy summary.");
    }

    #[tokio::test]
    async fn test_summarize_empty_response_is_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_body("  \n  ")))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let result = summarize(&client, "some article text").await;
        assert!(matches!(result.unwrap_err(), OllamaError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_summarize_backend_error_is_isolated() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let result = summarize(&client, "some article text").await;
        assert!(matches!(
            result.unwrap_err(),
            OllamaError::Api { status: 500, .. }
        ));
    }
}
