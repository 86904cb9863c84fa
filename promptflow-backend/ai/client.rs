use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;

use super::{ChatCompletionRequest, ChatCompletionResponse, OPENROUTER_CHAT_URL};

const REFERER: &str = "http://localhost:3000";
const APP_TITLE: &str = "My AI App";

#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Forward `prompt` upstream and return the text of the first choice.
    async fn complete(&self, prompt: &str) -> Result<String>;
}

pub struct OpenRouterClient {
    client: Client,
    api_key: Option<String>,
    url: String,
}

impl OpenRouterClient {
    pub fn new(client: Client, api_key: Option<String>) -> Self {
        Self {
            client,
            api_key,
            url: OPENROUTER_CHAT_URL.to_string(),
        }
    }

    /// Point the client at a different chat-completion URL.
    #[cfg_attr(not(test), allow(dead_code))]
    pub(crate) fn with_url(client: Client, api_key: Option<String>, url: impl Into<String>) -> Self {
        Self {
            client,
            api_key,
            url: url.into(),
        }
    }
}

#[async_trait]
impl CompletionClient for OpenRouterClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .context("OPENROUTER_API_KEY is not set")?;

        let resp = self
            .client
            .post(&self.url)
            .bearer_auth(api_key)
            .header("HTTP-Referer", REFERER)
            .header("X-Title", APP_TITLE)
            .json(&ChatCompletionRequest::for_prompt(prompt))
            .send()
            .await
            .context("failed to reach completion API")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("completion API error {status}: {body}");
        }

        let payload: ChatCompletionResponse = resp
            .json()
            .await
            .context("failed to parse completion payload")?;
        payload.into_reply()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    const PATH: &str = "/api/v1/chat/completions";

    fn client_for(server: &MockServer) -> OpenRouterClient {
        OpenRouterClient::with_url(
            Client::new(),
            Some("sk-or-test".to_string()),
            server.url(PATH),
        )
    }

    #[tokio::test]
    async fn test_complete_sends_expected_request() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(PATH)
                    .header("authorization", "Bearer sk-or-test")
                    .header("http-referer", "http://localhost:3000")
                    .header("x-title", "My AI App")
                    .json_body(json!({
                        "model": "google/gemini-2.5-flash",
                        "messages": [{ "role": "user", "content": "Hello" }],
                        "max_tokens": 300,
                        "temperature": 0.7
                    }));
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(json!({
                        "choices": [{ "message": { "role": "assistant", "content": "Hi there!" } }]
                    }));
            })
            .await;

        let reply = client_for(&server).complete("Hello").await.unwrap();

        assert_eq!(reply, "Hi there!");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_upstream_error_status_fails() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path(PATH);
                then.status(401)
                    .json_body(json!({ "error": { "message": "No auth credentials found" } }));
            })
            .await;

        let err = client_for(&server).complete("Hello").await.unwrap_err();

        let message = err.to_string();
        assert!(message.contains("401"), "{message}");
        assert!(message.contains("No auth credentials found"), "{message}");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unparsable_success_body_fails() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(PATH);
                then.status(200).body("<html>gateway</html>");
            })
            .await;

        let err = client_for(&server).complete("Hello").await.unwrap_err();
        assert!(err.to_string().contains("failed to parse completion payload"));
    }

    #[tokio::test]
    async fn test_success_without_choices_fails() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(PATH);
                then.status(200).json_body(json!({ "id": "gen-1", "choices": [] }));
            })
            .await;

        let err = client_for(&server).complete("Hello").await.unwrap_err();
        assert!(err.to_string().contains("no choices"));
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_before_request() {
        let client = OpenRouterClient::new(Client::new(), None);
        let err = client.complete("Hello").await.unwrap_err();
        assert!(err.to_string().contains("OPENROUTER_API_KEY"));
    }
}
