pub mod memory_repository;
pub mod mongo_repository;
pub mod repository;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A saved prompt/response pair. Append-only: never updated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub prompt: String,
    pub response: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Current time truncated to the millisecond precision the store keeps.
pub(crate) fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}
