pub mod ai;
pub mod flows;
pub mod middleware;
mod routes;

use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use hyper::StatusCode;
use serde_json::json;
use std::sync::Arc;

use crate::ai::client::CompletionClient;
use crate::flows::repository::FlowRecordRepository;

#[derive(Clone)]
pub struct AppState {
    pub completion_client: Arc<dyn CompletionClient>,
    /// `None` when no store is configured; saves then fail like an
    /// unreachable store would.
    pub flow_repo: Option<Arc<dyn FlowRecordRepository>>,
}

/// Failures surfaced to HTTP callers. Every cause inside a category
/// collapses to the same body; details only go to the log.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("Failed to fetch AI response")]
    Upstream,

    #[error("Failed to save flow")]
    Persistence,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}

pub fn create_app(state: AppState) -> Router {
    routes::build_router(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn test_upstream_error_renders_fixed_body() {
        let resp = ApiError::Upstream.into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "error": "Failed to fetch AI response" }));
    }

    #[tokio::test]
    async fn test_persistence_error_renders_fixed_body() {
        let resp = ApiError::Persistence.into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "error": "Failed to save flow" }));
    }
}
