use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::{ApiError, AppState};
use crate::flows::FlowRecord;

#[derive(Deserialize)]
pub(crate) struct SaveFlowRequest {
    #[serde(default)]
    prompt: String,
    #[serde(default)]
    response: String,
}

#[derive(Serialize)]
pub(crate) struct SaveFlowResponse {
    message: &'static str,
    data: FlowRecord,
}

/// Appends one record per call. No dedup: identical bodies produce
/// distinct records.
#[tracing::instrument(skip_all)]
pub(crate) async fn save_flow(
    State(state): State<AppState>,
    Json(body): Json<SaveFlowRequest>,
) -> Result<Json<SaveFlowResponse>, ApiError> {
    let Some(repo) = state.flow_repo.as_ref() else {
        tracing::error!("DB save error: no flow store configured (set MONGODB_URI)");
        return Err(ApiError::Persistence);
    };

    match repo.insert(&body.prompt, &body.response).await {
        Ok(record) => {
            tracing::info!(id = %record.id, "flow saved");
            Ok(Json(SaveFlowResponse {
                message: "Flow saved successfully",
                data: record,
            }))
        }
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "DB save error");
            Err(ApiError::Persistence)
        }
    }
}
