use anyhow::Result;
use async_trait::async_trait;

use super::FlowRecord;

#[async_trait]
pub trait FlowRecordRepository: Send + Sync {
    /// Insert a new record. Identity and `created_at` are assigned here.
    async fn insert(&self, prompt: &str, response: &str) -> Result<FlowRecord>;
}
