//! Firestore backend over the REST API
//!
//! Each flush is one atomic `documents:commit` carrying one create per
//! record under a client-generated document id. Firestore meters writes per
//! request, so this backend is request-bound and reports `RESOURCE_EXHAUSTED`
//! / HTTP 429 responses as quota errors.
//!
//! # Examples
//!
//! ```no_run
//! use ddi_store::{FirestoreAuth, FirestoreConfig, FirestoreStore};
//!
//! let config = FirestoreConfig::new("smartpilladvisor", FirestoreAuth::Token("ya29...".into()));
//! let store = FirestoreStore::new(config).unwrap();
//! ```

mod auth;

pub use auth::{ServiceAccountKey, DATASTORE_SCOPE, DEFAULT_TOKEN_URI};

use crate::{StoreError, INTERACTIONS};
use auth::AccessToken;
use ddi_domain::{columns, IndexField, InteractionRecord, StoreAdapter, StoreInspector, WriteResult};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::Duration;

/// Production REST endpoint
pub const DEFAULT_ENDPOINT: &str = "https://firestore.googleapis.com";

/// Maximum number of writes Firestore accepts in one commit
pub const MAX_WRITES_PER_COMMIT: usize = 500;

/// Default timeout for REST requests (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// How requests are authenticated
#[derive(Debug, Clone)]
pub enum FirestoreAuth {
    /// Local emulator, which accepts the fixed `owner` token
    Emulator,
    /// Pre-issued OAuth2 bearer token
    Token(String),
    /// Service-account key exchanged for access tokens on demand
    ServiceAccount(ServiceAccountKey),
}

/// Connection settings for [`FirestoreStore`]
#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    /// Google Cloud project id
    pub project_id: String,
    /// Database id, `(default)` unless a named database is used
    pub database: String,
    /// Collection receiving the records
    pub collection: String,
    /// Base URL, production or `http://host:port` of an emulator
    pub endpoint: String,
    /// Credentials
    pub auth: FirestoreAuth,
}

impl FirestoreConfig {
    /// Production settings for `project_id` writing to [`INTERACTIONS`]
    pub fn new(project_id: impl Into<String>, auth: FirestoreAuth) -> Self {
        Self {
            project_id: project_id.into(),
            database: "(default)".to_string(),
            collection: INTERACTIONS.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            auth,
        }
    }

    /// Target a local emulator (`host:port`, as in `FIRESTORE_EMULATOR_HOST`)
    pub fn with_emulator(mut self, host: &str) -> Self {
        self.endpoint = format!("http://{}", host.trim_end_matches('/'));
        self.auth = FirestoreAuth::Emulator;
        self
    }

    /// Resource path of the database's document root
    fn documents_path(&self) -> String {
        format!("projects/{}/databases/{}/documents", self.project_id, self.database)
    }
}

/// Firestore implementation of `StoreAdapter`
pub struct FirestoreStore {
    client: reqwest::Client,
    config: FirestoreConfig,
    token: Option<AccessToken>,
}

impl FirestoreStore {
    /// Create a store; no request is made until the first operation
    pub fn new(config: FirestoreConfig) -> Result<Self, StoreError> {
        if config.project_id.is_empty() {
            return Err(StoreError::Config("Firestore project id is empty".into()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| StoreError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config,
            token: None,
        })
    }

    fn url(&self, suffix: &str) -> String {
        format!("{}/v1/{}{}", self.config.endpoint, self.config.documents_path(), suffix)
    }

    /// Current bearer token, refreshing a service-account token when stale
    async fn bearer(&mut self) -> Result<String, StoreError> {
        match &self.config.auth {
            FirestoreAuth::Emulator => Ok("owner".to_string()),
            FirestoreAuth::Token(token) => Ok(token.clone()),
            FirestoreAuth::ServiceAccount(key) => {
                if let Some(token) = self.token.as_ref().filter(|t| t.is_fresh()) {
                    return Ok(token.value.clone());
                }
                let token = auth::exchange(&self.client, key).await?;
                let value = token.value.clone();
                self.token = Some(token);
                Ok(value)
            }
        }
    }

    async fn post_json(&mut self, suffix: &str, body: &Value) -> Result<Value, StoreError> {
        let bearer = self.bearer().await?;
        let response = self
            .client
            .post(self.url(suffix))
            .bearer_auth(bearer)
            .json(body)
            .send()
            .await?;
        Self::read_json(response).await
    }

    async fn get_json(&mut self, suffix: &str) -> Result<Value, StoreError> {
        let bearer = self.bearer().await?;
        let response = self.client.get(self.url(suffix)).bearer_auth(bearer).send().await?;
        Self::read_json(response).await
    }

    async fn read_json(response: reqwest::Response) -> Result<Value, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }
        let body = response.text().await.unwrap_or_default();
        Err(classify_failure(status.as_u16(), &body))
    }

    /// Request body for one atomic commit creating every record
    fn commit_body(&self, records: &[InteractionRecord]) -> Value {
        let parent = format!("{}/{}", self.config.documents_path(), self.config.collection);
        let writes: Vec<Value> = records
            .iter()
            .map(|record| {
                json!({
                    "update": {
                        "name": format!("{}/{}", parent, uuid::Uuid::now_v7().simple()),
                        "fields": encode_fields(record),
                    },
                    "currentDocument": { "exists": false },
                })
            })
            .collect();
        json!({ "writes": writes })
    }

    async fn list_documents(&mut self, page_size: usize) -> Result<Vec<InteractionRecord>, StoreError> {
        let suffix = format!("/{}?pageSize={}", self.config.collection, page_size);
        let listing: DocumentList = serde_json::from_value(self.get_json(&suffix).await?)?;
        listing
            .documents
            .iter()
            .map(|doc| decode_fields(&doc.fields))
            .collect()
    }
}

impl StoreAdapter for FirestoreStore {
    type Error = StoreError;

    fn name(&self) -> &'static str {
        "firestore"
    }

    fn is_request_bound(&self) -> bool {
        true
    }

    fn max_batch_size(&self) -> Option<usize> {
        Some(MAX_WRITES_PER_COMMIT)
    }

    async fn create_indexes(&mut self, fields: &[IndexField]) -> Result<(), Self::Error> {
        // Firestore maintains ascending single-field indexes for every field
        // automatically, so there is nothing to build.
        tracing::debug!(
            "Firestore single-field indexes are automatic: {:?}",
            fields.iter().map(|f| f.column()).collect::<Vec<_>>()
        );
        Ok(())
    }

    async fn bulk_write(&mut self, records: &[InteractionRecord]) -> Result<WriteResult, Self::Error> {
        if records.is_empty() {
            return Ok(WriteResult::default());
        }
        if records.len() > MAX_WRITES_PER_COMMIT {
            return Err(StoreError::InvalidData(format!(
                "Batch of {} exceeds the Firestore limit of {} writes per commit",
                records.len(),
                MAX_WRITES_PER_COMMIT
            )));
        }

        let body = self.commit_body(records);
        let response = self.post_json(":commit", &body).await?;
        let written = response
            .get("writeResults")
            .and_then(Value::as_array)
            .map(|results| results.len())
            .unwrap_or(records.len());

        tracing::debug!("Firestore commit wrote {} documents", written);
        Ok(WriteResult { written })
    }
}

impl StoreInspector for FirestoreStore {
    async fn ping(&mut self) -> Result<(), Self::Error> {
        self.list_documents(1).await.map(|_| ())
    }

    async fn count(&mut self) -> Result<u64, Self::Error> {
        let body = json!({
            "structuredAggregationQuery": {
                "structuredQuery": { "from": [{ "collectionId": self.config.collection }] },
                "aggregations": [{ "alias": "total", "count": {} }],
            }
        });
        let response = self.post_json(":runAggregationQuery", &body).await?;
        parse_count(&response)
    }

    async fn sample(&mut self, limit: usize) -> Result<Vec<InteractionRecord>, Self::Error> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        self.list_documents(limit).await
    }
}

#[derive(Deserialize)]
struct DocumentList {
    #[serde(default)]
    documents: Vec<Document>,
}

#[derive(Deserialize)]
struct Document {
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

fn string_or_null(value: Option<&str>) -> Value {
    match value {
        Some(s) => json!({ "stringValue": s }),
        None => json!({ "nullValue": null }),
    }
}

/// Firestore typed-value encoding of a record
fn encode_fields(record: &InteractionRecord) -> Value {
    let mut fields = Map::new();
    fields.insert(columns::DRUG_A.into(), string_or_null(Some(&record.drug_a)));
    fields.insert(columns::DRUG_B.into(), string_or_null(Some(&record.drug_b)));
    fields.insert(columns::LEVEL.into(), string_or_null(Some(&record.level)));
    fields.insert(columns::ID_A.into(), string_or_null(record.id_a.as_deref()));
    fields.insert(columns::ID_B.into(), string_or_null(record.id_b.as_deref()));
    Value::Object(fields)
}

fn decode_fields(fields: &Map<String, Value>) -> Result<InteractionRecord, StoreError> {
    let string = |name: &str| {
        fields
            .get(name)
            .and_then(|v| v.get("stringValue"))
            .and_then(Value::as_str)
    };

    let record = InteractionRecord::from_row(string)
        .map_err(|e| StoreError::InvalidData(format!("Stored document: {}", e)))?;
    Ok(record)
}

/// Pull the `total` aggregate out of a `runAggregationQuery` response
fn parse_count(response: &Value) -> Result<u64, StoreError> {
    response
        .as_array()
        .into_iter()
        .flatten()
        .find_map(|item| item.pointer("/result/aggregateFields/total/integerValue"))
        .and_then(|v| match v {
            Value::String(s) => s.parse().ok(),
            other => other.as_u64(),
        })
        .ok_or_else(|| StoreError::InvalidData("Aggregation response has no count".into()))
}

/// Map a failed response onto the store error taxonomy
fn classify_failure(status: u16, body: &str) -> StoreError {
    let (api_status, message) = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => (envelope.error.status, envelope.error.message),
        Err(_) => (String::new(), body.to_string()),
    };

    if status == 429 || api_status == "RESOURCE_EXHAUSTED" || message.contains("Quota exceeded") {
        StoreError::QuotaExceeded(if message.is_empty() { api_status } else { message })
    } else if status == 401 || status == 403 {
        StoreError::Auth(message)
    } else {
        StoreError::Api { status, message }
    }
}
