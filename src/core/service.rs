//! Store traits for the document and graph datastores

use crate::core::record::{TestRecord, TestRelationship};
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The two datastores the foundation talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StoreKind {
    Document,
    Graph,
}

impl StoreKind {
    /// Key used for this store in health reports and error details
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKind::Document => "documentStore",
            StoreKind::Graph => "graphStore",
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreKind::Document => write!(f, "MongoDB"),
            StoreKind::Graph => write!(f, "Neo4j"),
        }
    }
}

/// Document-store operations used by the smoke-test routes
///
/// Implementations wrap a live client handle. Pooling and thread safety are
/// left to the underlying driver.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Round-trip a no-op command to the server
    async fn ping(&self) -> Result<()>;

    /// Insert a test record and return what was stored
    async fn insert(&self, record: TestRecord) -> Result<TestRecord>;

    /// Fetch a test record by id
    ///
    /// Returns `Ok(None)` if the record does not exist.
    async fn get(&self, id: &str) -> Result<Option<TestRecord>>;

    /// Fetch the most recently created test record
    async fn latest(&self) -> Result<Option<TestRecord>>;

    /// List up to `limit` test records, newest first
    async fn recent(&self, limit: usize) -> Result<Vec<TestRecord>>;

    /// Release the client handle
    async fn close(&self) {}
}

/// Graph-store operations used by the smoke-test routes
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Run a trivial query against the server
    async fn ping(&self) -> Result<()>;

    /// Create a `TestRecord` node and return what was stored
    async fn create_node(&self, record: TestRecord) -> Result<TestRecord>;

    /// Fetch a node by its record id
    ///
    /// Returns `Ok(None)` if no node carries this id.
    async fn get_node(&self, id: &str) -> Result<Option<TestRecord>>;

    /// Fetch the most recently created node
    async fn latest_node(&self) -> Result<Option<TestRecord>>;

    /// Merge two `Person` nodes and the relationship between them
    async fn create_relationship(&self, rel: TestRelationship) -> Result<TestRelationship>;

    /// List up to `limit` `Person` relationships
    async fn relationships(&self, limit: usize) -> Result<Vec<TestRelationship>>;

    /// Release the driver handle
    async fn close(&self) {}
}
