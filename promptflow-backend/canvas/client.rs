use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;

#[derive(thiserror::Error, Debug)]
pub enum FlowApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Record echoed back by the save endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SavedFlow {
    #[serde(rename = "_id")]
    pub id: String,
    pub prompt: String,
    pub response: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct AskAiReply {
    response: String,
}

#[derive(Deserialize)]
struct SaveFlowReply {
    data: SavedFlow,
}

/// The two server endpoints the canvas talks to.
#[async_trait]
pub trait FlowApi: Send + Sync {
    async fn ask_ai(&self, prompt: &str) -> Result<String, FlowApiError>;
    async fn save_flow(&self, prompt: &str, response: &str) -> Result<SavedFlow, FlowApiError>;
}

pub struct HttpFlowApi {
    client: Client,
    server_url: String,
}

impl HttpFlowApi {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            server_url: server_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T, FlowApiError> {
        let url = format!("{}{path}", self.server_url);
        let resp = self.client.post(&url).json(&body).send().await?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(FlowApiError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        parse_reply(&text)
    }
}

fn parse_reply<T: DeserializeOwned>(text: &str) -> Result<T, FlowApiError> {
    serde_json::from_str(text).map_err(|e| FlowApiError::Malformed(e.to_string()))
}

#[async_trait]
impl FlowApi for HttpFlowApi {
    async fn ask_ai(&self, prompt: &str) -> Result<String, FlowApiError> {
        let reply: AskAiReply = self.post("/api/ask-ai", json!({ "prompt": prompt })).await?;
        Ok(reply.response)
    }

    async fn save_flow(&self, prompt: &str, response: &str) -> Result<SavedFlow, FlowApiError> {
        let reply: SaveFlowReply = self
            .post(
                "/api/save-flow",
                json!({ "prompt": prompt, "response": response }),
            )
            .await?;
        Ok(reply.data)
    }
}
