//! MongoDB backend
//!
//! Records are inserted with `insert_many`, one document per record. The
//! connection string always comes from configuration (`MONGODB_URI`), never
//! from source.

use crate::{StoreError, INTERACTIONS};
use ddi_domain::{IndexField, InteractionRecord, StoreAdapter, StoreInspector, WriteResult};
use mongodb::bson::{doc, Document};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, IndexModel};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default database name
pub const DEFAULT_DATABASE: &str = "smartpilladvisor";

/// Default server selection timeout (5 seconds)
pub const DEFAULT_SERVER_SELECTION_TIMEOUT_SECS: u64 = 5;

/// Server code for "request rate is large"
const REQUEST_RATE_TOO_LARGE: i32 = 16500;

/// Server code used by Atlas for its own limits (quota, tier restrictions)
const ATLAS_ERROR: i32 = 8000;

/// Connection settings for [`MongoStore`]
#[derive(Debug, Clone)]
pub struct MongoConfig {
    /// Connection string (`mongodb://` or `mongodb+srv://`)
    pub uri: String,
    /// Database name
    pub database: String,
    /// Collection receiving the records
    pub collection: String,
    /// How long to wait for a reachable server before failing
    pub server_selection_timeout: Duration,
}

impl MongoConfig {
    /// Settings for `uri` with the default database and collection
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            database: DEFAULT_DATABASE.to_string(),
            collection: INTERACTIONS.to_string(),
            server_selection_timeout: Duration::from_secs(DEFAULT_SERVER_SELECTION_TIMEOUT_SECS),
        }
    }

    /// Override the database name
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }
}

/// Stored document shape
///
/// Absent identifiers are serialized as `null`, not omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionDocument {
    #[serde(rename = "Drug_A")]
    drug_a: String,
    #[serde(rename = "Drug_B")]
    drug_b: String,
    #[serde(rename = "Level")]
    level: String,
    #[serde(rename = "DDInterID_A", default)]
    id_a: Option<String>,
    #[serde(rename = "DDInterID_B", default)]
    id_b: Option<String>,
}

impl From<&InteractionRecord> for InteractionDocument {
    fn from(record: &InteractionRecord) -> Self {
        Self {
            drug_a: record.drug_a.clone(),
            drug_b: record.drug_b.clone(),
            level: record.level.clone(),
            id_a: record.id_a.clone(),
            id_b: record.id_b.clone(),
        }
    }
}

impl TryFrom<InteractionDocument> for InteractionRecord {
    type Error = StoreError;

    fn try_from(doc: InteractionDocument) -> Result<Self, Self::Error> {
        InteractionRecord::new(doc.drug_a, doc.drug_b, doc.level)
            .map(|r| r.with_ids(doc.id_a.as_deref(), doc.id_b.as_deref()))
            .map_err(|e| StoreError::InvalidData(format!("Stored document: {}", e)))
    }
}

/// MongoDB implementation of `StoreAdapter`
pub struct MongoStore {
    client: Client,
    collection: Collection<InteractionDocument>,
}

impl MongoStore {
    /// Build a client for the configured cluster
    ///
    /// The driver connects lazily; use `ping` to surface an unreachable
    /// cluster before ingesting.
    pub async fn connect(config: MongoConfig) -> Result<Self, StoreError> {
        if config.uri.is_empty() {
            return Err(StoreError::Config("MongoDB connection string is empty".into()));
        }

        let mut options = ClientOptions::parse(&config.uri).await?;
        options.server_selection_timeout = Some(config.server_selection_timeout);
        options.app_name = Some("ddi-import".to_string());

        let client = Client::with_options(options)?;
        let collection = client
            .database(&config.database)
            .collection::<InteractionDocument>(&config.collection);

        tracing::debug!("MongoDB client ready for {}.{}", config.database, config.collection);
        Ok(Self { client, collection })
    }
}

impl StoreAdapter for MongoStore {
    type Error = StoreError;

    fn name(&self) -> &'static str {
        "mongodb"
    }

    fn is_request_bound(&self) -> bool {
        false
    }

    async fn create_indexes(&mut self, fields: &[IndexField]) -> Result<(), Self::Error> {
        // Re-creating an identical index is a server-side no-op.
        for field in fields {
            let mut keys = Document::new();
            keys.insert(field.column(), 1);
            let model = IndexModel::builder().keys(keys).build();
            self.collection.create_index(model).await?;
        }
        tracing::debug!("Ensured {} MongoDB indexes", fields.len());
        Ok(())
    }

    async fn bulk_write(&mut self, records: &[InteractionRecord]) -> Result<WriteResult, Self::Error> {
        if records.is_empty() {
            return Ok(WriteResult::default());
        }
        let docs: Vec<InteractionDocument> = records.iter().map(InteractionDocument::from).collect();
        let result = self.collection.insert_many(docs).await?;
        Ok(WriteResult {
            written: result.inserted_ids.len(),
        })
    }
}

impl StoreInspector for MongoStore {
    async fn ping(&mut self) -> Result<(), Self::Error> {
        self.client.database("admin").run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    async fn count(&mut self) -> Result<u64, Self::Error> {
        Ok(self.collection.count_documents(doc! {}).await?)
    }

    async fn sample(&mut self, limit: usize) -> Result<Vec<InteractionRecord>, Self::Error> {
        let mut cursor = self.collection.find(doc! {}).limit(limit as i64).await?;
        let mut records = Vec::with_capacity(limit);
        while cursor.advance().await? {
            records.push(InteractionRecord::try_from(cursor.deserialize_current()?)?);
        }
        Ok(records)
    }
}

/// Whether a server error code / message means the cluster is throttling us
pub(crate) fn is_quota_signal(code: Option<i32>, message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    match code {
        Some(REQUEST_RATE_TOO_LARGE) => true,
        Some(ATLAS_ERROR) if lower.contains("quota") => true,
        _ => {
            message.contains("RESOURCE_EXHAUSTED")
                || lower.contains("quota exceeded")
                || lower.contains("rate limit")
                || lower.contains("request rate is large")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{self, Bson};

    #[test]
    fn test_document_keeps_null_identifiers() {
        let record = InteractionRecord::new("Abacavir", "Aspirin", "Minor")
            .unwrap()
            .with_ids(None, Some("DDInter2"));
        let doc = bson::to_document(&InteractionDocument::from(&record)).unwrap();

        assert_eq!(doc.get_str("Drug_A").unwrap(), "Abacavir");
        assert_eq!(doc.get_str("Level").unwrap(), "Minor");
        assert_eq!(doc.get("DDInterID_A"), Some(&Bson::Null));
        assert_eq!(doc.get_str("DDInterID_B").unwrap(), "DDInter2");
    }

    #[test]
    fn test_document_to_record() {
        let doc = doc! {
            "_id": 1,
            "Drug_A": "Naltrexone",
            "Drug_B": "Abacavir",
            "Level": "Moderate",
            "DDInterID_A": "",
            "DDInterID_B": Bson::Null,
        };
        let stored: InteractionDocument = bson::from_document(doc).unwrap();
        let record = InteractionRecord::try_from(stored).unwrap();
        assert_eq!(record.drug_a, "Naltrexone");
        assert_eq!(record.id_a, None);
        assert_eq!(record.id_b, None);
    }

    #[test]
    fn test_config_defaults() {
        let config = MongoConfig::new("mongodb://localhost:27017").with_database("ddi_test");
        assert_eq!(config.database, "ddi_test");
        assert_eq!(config.collection, "interactions");
        assert_eq!(config.server_selection_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_quota_signals() {
        assert!(is_quota_signal(Some(16500), "Request rate is large"));
        assert!(is_quota_signal(Some(8000), "AtlasError: you are over your space quota"));
        assert!(is_quota_signal(None, "RESOURCE_EXHAUSTED: try later"));
        assert!(is_quota_signal(None, "Quota exceeded for writes"));
        assert!(is_quota_signal(None, "Error=16500, Request rate is large"));
        assert!(!is_quota_signal(Some(8000), "bad auth : authentication failed"));
        assert!(!is_quota_signal(Some(11000), "E11000 duplicate key error"));
        assert!(!is_quota_signal(None, "connection refused"));
    }

    #[tokio::test]
    async fn test_empty_uri_rejected() {
        let result = MongoStore::connect(MongoConfig::new("")).await;
        assert!(matches!(result, Err(StoreError::Config(_))));
    }

    #[tokio::test]
    async fn test_malformed_uri_rejected() {
        let result = MongoStore::connect(MongoConfig::new("not-a-mongo-uri")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    #[ignore] // Only run when a MongoDB server is reachable via MONGODB_URI
    async fn test_live_round_trip() {
        let uri = std::env::var("MONGODB_URI").unwrap_or_default();
        let mut store = MongoStore::connect(MongoConfig::new(uri).with_database("ddi_loader_test"))
            .await
            .unwrap();
        store.ping().await.unwrap();
        store.create_indexes(&IndexField::ALL).await.unwrap();
        store.create_indexes(&IndexField::ALL).await.unwrap();

        let before = store.count().await.unwrap();
        let record = InteractionRecord::new("A", "B", "Minor").unwrap();
        assert_eq!(store.bulk_write(&[record]).await.unwrap().written, 1);
        assert_eq!(store.count().await.unwrap(), before + 1);
    }
}
