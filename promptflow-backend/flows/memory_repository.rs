use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::repository::FlowRecordRepository;
use super::{FlowRecord, now_millis};

/// In-process store for local runs without MongoDB.
#[derive(Default)]
pub struct MemoryFlowRepository {
    records: RwLock<Vec<FlowRecord>>,
}

impl MemoryFlowRepository {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn records(&self) -> Vec<FlowRecord> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl FlowRecordRepository for MemoryFlowRepository {
    async fn insert(&self, prompt: &str, response: &str) -> Result<FlowRecord> {
        let record = FlowRecord {
            id: Uuid::new_v4().simple().to_string(),
            prompt: prompt.to_string(),
            response: response.to_string(),
            created_at: now_millis(),
        };
        self.records.write().await.push(record.clone());
        tracing::debug!(id = %record.id, "stored flow record in memory");
        Ok(record)
    }
}
