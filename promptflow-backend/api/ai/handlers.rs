use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::{ApiError, AppState};

#[derive(Deserialize)]
pub(crate) struct AskAiRequest {
    #[serde(default)]
    prompt: String,
}

#[derive(Serialize)]
pub(crate) struct AskAiResponse {
    response: String,
}

/// Forwards the prompt verbatim (empty or not) and returns the first
/// completion choice.
#[tracing::instrument(skip_all)]
pub(crate) async fn ask_ai(
    State(state): State<AppState>,
    Json(body): Json<AskAiRequest>,
) -> Result<Json<AskAiResponse>, ApiError> {
    tracing::info!(prompt_len = body.prompt.len(), "forwarding prompt upstream");
    match state.completion_client.complete(&body.prompt).await {
        Ok(response) => {
            tracing::info!(response_len = response.len(), "AI response ready");
            Ok(Json(AskAiResponse { response }))
        }
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "AI API error");
            Err(ApiError::Upstream)
        }
    }
}
