use anyhow::{Context, Result};
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{self, doc};
use mongodb::{Client, Collection};
use serde::{Deserialize, Serialize};

use super::repository::FlowRecordRepository;
use super::{FlowRecord, now_millis};

const COLLECTION: &str = "flows";
const FALLBACK_DATABASE: &str = "test";

/// Stored shape of a record. Field names match what the web client's
/// MongoDB schema wrote, so existing collections stay readable.
#[derive(Debug, Serialize, Deserialize)]
struct FlowDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    prompt: String,
    response: String,
    #[serde(rename = "createdAt")]
    created_at: bson::DateTime,
}

pub struct MongoFlowRepository {
    client: Client,
    collection: Collection<FlowDocument>,
}

impl MongoFlowRepository {
    /// Build a repository from a connection string. The driver connects
    /// lazily, so this only fails on an unparsable URI.
    pub async fn connect(uri: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri)
            .await
            .context("failed to parse MongoDB connection string")?;
        let database = client
            .default_database()
            .unwrap_or_else(|| client.database(FALLBACK_DATABASE));
        tracing::info!(database = %database.name(), collection = COLLECTION, "using MongoDB store");

        let collection = database.collection(COLLECTION);
        Ok(Self { client, collection })
    }

    /// Round-trip a ping so startup logs whether the store is reachable.
    pub async fn ping(&self) -> Result<()> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .context("MongoDB ping failed")?;
        Ok(())
    }
}

#[async_trait]
impl FlowRecordRepository for MongoFlowRepository {
    async fn insert(&self, prompt: &str, response: &str) -> Result<FlowRecord> {
        let created_at = now_millis();
        let document = FlowDocument {
            id: ObjectId::new(),
            prompt: prompt.to_string(),
            response: response.to_string(),
            created_at: bson::DateTime::from_millis(created_at.timestamp_millis()),
        };

        self.collection
            .insert_one(&document, None)
            .await
            .context("failed to insert flow record")?;

        Ok(FlowRecord {
            id: document.id.to_hex(),
            prompt: document.prompt,
            response: document.response,
            created_at,
        })
    }
}
