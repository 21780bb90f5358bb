//! MongoDB document store using the official MongoDB async driver.
//!
//! Provides `MongoDocumentStore`, backed by a `mongodb::Client` and the
//! `test_collection` collection of the configured database.
//!
//! # Feature flag
//!
//! This module is gated behind the `mongodb_backend` feature flag (enabled
//! by default).
//!
//! # Storage model
//!
//! Records are serialized via `serde_json::Value` as an intermediate format,
//! then converted to BSON documents. The record `id` is mapped to MongoDB's
//! `_id` convention and stored as a string; `created_at` is stored as an
//! RFC 3339 string. A numeric `created_ts` (microseconds) is stored alongside
//! for ordering and indexed descending.

use crate::core::DocumentStore;
use crate::core::record::TestRecord;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{Bson, Document, doc};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, Database, IndexModel};
use std::time::Duration;

/// Collection holding the smoke-test documents
pub const TEST_COLLECTION: &str = "test_collection";

const SORT_FIELD: &str = "created_ts";

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------

/// Convert a record into a BSON Document, renaming `id` → `_id`.
fn record_to_document(record: &TestRecord) -> Result<Document> {
    let mut json = serde_json::to_value(record).context("Failed to serialize record")?;
    if let Some(obj) = json.as_object_mut() {
        obj.insert(SORT_FIELD.to_string(), record.sort_key().into());
    }

    let bson_val = mongodb::bson::to_bson(&json).context("Failed to convert JSON to BSON")?;

    let mut doc = match bson_val {
        Bson::Document(d) => d,
        _ => return Err(anyhow!("Expected BSON document, got non-object")),
    };

    if let Some(id) = doc.remove("id") {
        doc.insert("_id", id);
    }

    Ok(doc)
}

/// Convert a BSON Document back into a record, renaming `_id` → `id`.
fn document_to_record(mut doc: Document) -> Result<TestRecord> {
    doc.remove(SORT_FIELD);
    if let Some(id) = doc.remove("_id") {
        doc.insert("id", id);
    }

    let json = Bson::Document(doc).into_relaxed_extjson();
    serde_json::from_value(json).context("Failed to deserialize record from document")
}

// ---------------------------------------------------------------------------
// MongoDocumentStore
// ---------------------------------------------------------------------------

/// Document store backed by MongoDB.
///
/// # Example
///
/// ```rust,ignore
/// let store = MongoDocumentStore::connect("mongodb://localhost:27017", "gst_reconciliation").await?;
/// store.ping().await?;
/// let record = store.insert(TestRecord::new(TestRecordInput::new("hello"))).await?;
/// ```
#[derive(Clone, Debug)]
pub struct MongoDocumentStore {
    client: Client,
    database: Database,
}

impl MongoDocumentStore {
    /// Build a client from a connection string.
    ///
    /// The driver connects lazily; an unreachable server surfaces on the first
    /// ping or operation rather than here. SRV lookups and malformed URIs fail
    /// immediately.
    pub async fn connect(uri: &str, db_name: &str) -> Result<Self> {
        let mut options = ClientOptions::parse(uri)
            .await
            .context("Failed to parse MongoDB connection string")?;
        options.app_name = Some("gst-foundation".to_string());
        options.server_selection_timeout = Some(Duration::from_secs(30));
        options.connect_timeout = Some(Duration::from_secs(30));

        let client = Client::with_options(options).context("Failed to create MongoDB client")?;
        Ok(Self::new(client, db_name))
    }

    /// Wrap an existing client.
    pub fn new(client: Client, db_name: &str) -> Self {
        let database = client.database(db_name);
        Self { client, database }
    }

    /// Get a reference to the underlying database.
    pub fn database(&self) -> &Database {
        &self.database
    }

    fn collection(&self) -> Collection<Document> {
        self.database.collection(TEST_COLLECTION)
    }

    /// Create the descending index used by `latest` and `recent`.
    ///
    /// Idempotent; safe to call on every startup.
    pub async fn ensure_indexes(&self) -> Result<()> {
        let index = IndexModel::builder().keys(doc! { "created_ts": -1 }).build();
        self.collection()
            .create_index(index)
            .await
            .context("Failed to create created_ts index")?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MongoDocumentStore {
    async fn ping(&self) -> Result<()> {
        let reply = self
            .client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .context("MongoDB ping failed")?;

        let ok = reply
            .get("ok")
            .and_then(|v| match v {
                Bson::Double(d) => Some(*d),
                Bson::Int32(i) => Some(f64::from(*i)),
                Bson::Int64(i) => Some(*i as f64),
                _ => None,
            })
            .unwrap_or(0.0);

        if ok == 1.0 {
            Ok(())
        } else {
            Err(anyhow!("MongoDB ping returned ok={}", ok))
        }
    }

    async fn insert(&self, record: TestRecord) -> Result<TestRecord> {
        let doc = record_to_document(&record)?;

        self.collection()
            .insert_one(doc)
            .await
            .context("Failed to insert document")?;

        Ok(record)
    }

    async fn get(&self, id: &str) -> Result<Option<TestRecord>> {
        let doc = self
            .collection()
            .find_one(doc! { "_id": id })
            .await
            .context("Failed to fetch document")?;

        doc.map(document_to_record).transpose()
    }

    async fn latest(&self) -> Result<Option<TestRecord>> {
        Ok(self.recent(1).await?.into_iter().next())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<TestRecord>> {
        let cursor = self
            .collection()
            .find(doc! {})
            .sort(doc! { "created_ts": -1 })
            .limit(limit as i64)
            .await
            .context("Failed to list documents")?;

        let docs: Vec<Document> = cursor
            .try_collect()
            .await
            .context("Failed to collect documents")?;

        docs.into_iter().map(document_to_record).collect()
    }

    async fn close(&self) {
        self.client.clone().shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::TestRecordInput;

    #[test]
    fn test_record_to_document_maps_id() {
        let record = TestRecord::new(TestRecordInput::new("hello").with_name("test_item"));
        let doc = record_to_document(&record).unwrap();

        assert_eq!(doc.get_str("_id").unwrap(), record.id);
        assert!(doc.get("id").is_none());
        assert_eq!(doc.get_str("value").unwrap(), "hello");
        assert_eq!(doc.get_i64(SORT_FIELD).unwrap(), record.sort_key());
    }

    #[test]
    fn test_document_roundtrip_preserves_record() {
        let record = TestRecord::new(TestRecordInput::new("hello"));
        let doc = record_to_document(&record).unwrap();
        assert_eq!(document_to_record(doc).unwrap(), record);
    }

    #[test]
    fn test_document_without_value_is_rejected() {
        let doc = doc! { "_id": "abc", "created_at": "2024-01-01T00:00:00Z" };
        assert!(document_to_record(doc).is_err());
    }
}
