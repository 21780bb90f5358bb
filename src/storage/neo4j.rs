//! Neo4j graph store using the neo4rs Bolt protocol driver.
//!
//! Provides `Neo4jGraphStore`, backed by a `neo4rs::Graph` connection pool.
//!
//! # Feature flag
//!
//! This module is gated behind the `neo4j` feature flag (enabled by default).
//!
//! # Storage model
//!
//! Test records are stored as nodes labelled `TestRecord`. Scalar fields are
//! stored as individual node properties; a `__data` property holds the full
//! JSON string for reliable deserialization, and `created_ts` (microseconds)
//! orders nodes.
//!
//! The relationship smoke test merges `Person` nodes by name and connects
//! them with a native relationship whose type comes from the request.

use crate::core::GraphStore;
use crate::core::record::{TestRecord, TestRelationship, is_valid_relationship_type};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use neo4rs::{BoltMap, BoltString, BoltType, ConfigBuilder, Graph, Node, query};
use std::time::Duration;

/// Node label for test records
pub const RECORD_LABEL: &str = "TestRecord";

/// Node label for the relationship smoke test
pub const PERSON_LABEL: &str = "Person";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Conversion helpers: TestRecord ↔ Neo4j properties
// ---------------------------------------------------------------------------

/// Convert a record into a property map.
///
/// `name` is omitted when absent. `__data` carries the full JSON string.
fn record_to_bolt_props(record: &TestRecord) -> Result<BoltType> {
    let mut map = BoltMap::new();
    map.put(BoltString::from("id"), BoltType::from(record.id.clone()));
    map.put(BoltString::from("value"), BoltType::from(record.value.clone()));
    if let Some(name) = &record.name {
        map.put(BoltString::from("name"), BoltType::from(name.clone()));
    }
    map.put(
        BoltString::from("created_at"),
        BoltType::from(record.created_at.to_rfc3339()),
    );
    map.put(BoltString::from("created_ts"), BoltType::from(record.sort_key()));

    let json_str = serde_json::to_string(record)
        .map_err(|e| anyhow!("Failed to serialize record to string: {}", e))?;
    map.put(BoltString::from("__data"), BoltType::from(json_str));

    Ok(BoltType::Map(map))
}

/// Extract the `__data` JSON string from a node and deserialize it.
fn node_to_record(node: &Node) -> Result<TestRecord> {
    let data: String = node
        .get("__data")
        .map_err(|_| anyhow!("Missing __data property on node"))?;
    serde_json::from_str(&data).map_err(|e| anyhow!("Failed to deserialize record from __data: {}", e))
}

fn row_to_relationship(row: &neo4rs::Row) -> Result<TestRelationship> {
    Ok(TestRelationship {
        from: row
            .get("from")
            .map_err(|e| anyhow!("Failed to read relationship source: {}", e))?,
        relationship: row
            .get("relationship")
            .map_err(|e| anyhow!("Failed to read relationship type: {}", e))?,
        to: row
            .get("to")
            .map_err(|e| anyhow!("Failed to read relationship target: {}", e))?,
    })
}

// ---------------------------------------------------------------------------
// Neo4jGraphStore
// ---------------------------------------------------------------------------

/// Graph store backed by Neo4j.
///
/// # Example
///
/// ```rust,ignore
/// let store = Neo4jGraphStore::connect("bolt://127.0.0.1:7687", "neo4j", "password").await?;
/// let node = store.create_node(TestRecord::new(TestRecordInput::new("node1"))).await?;
/// ```
#[derive(Clone)]
pub struct Neo4jGraphStore {
    graph: Graph,
}

impl Neo4jGraphStore {
    /// Open a connection pool, giving up after ten seconds.
    pub async fn connect(uri: &str, user: &str, password: &str) -> Result<Self> {
        let config = ConfigBuilder::default()
            .uri(uri)
            .user(user)
            .password(password)
            .max_connections(10)
            .build()
            .map_err(|e| anyhow!("Invalid Neo4j configuration: {}", e))?;

        let graph = tokio::time::timeout(CONNECT_TIMEOUT, Graph::connect(config))
            .await
            .map_err(|_| anyhow!("Timed out connecting to Neo4j after {:?}", CONNECT_TIMEOUT))?
            .map_err(|e| anyhow!("Failed to connect to Neo4j: {}", e))?;

        Ok(Self::new(graph))
    }

    pub fn new(graph: Graph) -> Self {
        Self { graph }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Create the uniqueness constraint and ordering index for test records.
    ///
    /// Idempotent; safe to call on every startup.
    pub async fn ensure_indexes(&self) -> Result<()> {
        let constraint = format!(
            "CREATE CONSTRAINT IF NOT EXISTS FOR (n:`{}`) REQUIRE n.id IS UNIQUE",
            RECORD_LABEL
        );
        self.graph
            .run(query(&constraint))
            .await
            .map_err(|e| anyhow!("Failed to create uniqueness constraint: {}", e))?;

        let ts_idx = format!(
            "CREATE INDEX IF NOT EXISTS FOR (n:`{}`) ON (n.created_ts)",
            RECORD_LABEL
        );
        self.graph
            .run(query(&ts_idx))
            .await
            .map_err(|e| anyhow!("Failed to create created_ts index: {}", e))?;

        Ok(())
    }

    async fn fetch_one(&self, q: neo4rs::Query, what: &str) -> Result<Option<TestRecord>> {
        let mut result = self
            .graph
            .execute(q)
            .await
            .map_err(|e| anyhow!("Failed to {}: {}", what, e))?;

        match result
            .next()
            .await
            .map_err(|e| anyhow!("Failed to read result: {}", e))?
        {
            Some(row) => {
                let node: Node = row
                    .get("n")
                    .map_err(|e| anyhow!("Failed to get node: {}", e))?;
                Ok(Some(node_to_record(&node)?))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl GraphStore for Neo4jGraphStore {
    async fn ping(&self) -> Result<()> {
        self.graph
            .run(query("RETURN 1"))
            .await
            .map_err(|e| anyhow!("Neo4j ping failed: {}", e))
    }

    async fn create_node(&self, record: TestRecord) -> Result<TestRecord> {
        let props = record_to_bolt_props(&record)?;

        // MERGE on id so a repeated id updates rather than duplicates
        let cypher = format!(
            "MERGE (n:`{}` {{id: $id}}) SET n = $props RETURN n",
            RECORD_LABEL
        );

        self.fetch_one(
            query(&cypher)
                .param("id", record.id.clone())
                .param("props", props),
            "create node",
        )
        .await?
        .ok_or_else(|| anyhow!("No result returned from MERGE"))
    }

    async fn get_node(&self, id: &str) -> Result<Option<TestRecord>> {
        let cypher = format!("MATCH (n:`{}` {{id: $id}}) RETURN n", RECORD_LABEL);
        self.fetch_one(query(&cypher).param("id", id.to_string()), "get node")
            .await
    }

    async fn latest_node(&self) -> Result<Option<TestRecord>> {
        let cypher = format!(
            "MATCH (n:`{}`) RETURN n ORDER BY n.created_ts DESC LIMIT 1",
            RECORD_LABEL
        );
        self.fetch_one(query(&cypher), "get latest node").await
    }

    async fn create_relationship(&self, rel: TestRelationship) -> Result<TestRelationship> {
        // Relationship types cannot be parameterised in Cypher
        if !is_valid_relationship_type(&rel.relationship) {
            return Err(anyhow!("Invalid relationship type: {}", rel.relationship));
        }

        let cypher = format!(
            "MERGE (a:`{label}` {{name: $from}}) \
             MERGE (b:`{label}` {{name: $to}}) \
             MERGE (a)-[r:`{rel}`]->(b) \
             RETURN a.name AS from, type(r) AS relationship, b.name AS to",
            label = PERSON_LABEL,
            rel = rel.relationship
        );

        let mut result = self
            .graph
            .execute(
                query(&cypher)
                    .param("from", rel.from.clone())
                    .param("to", rel.to.clone()),
            )
            .await
            .map_err(|e| anyhow!("Failed to create relationship: {}", e))?;

        let row = result
            .next()
            .await
            .map_err(|e| anyhow!("Failed to read result: {}", e))?
            .ok_or_else(|| anyhow!("No result returned from MERGE"))?;

        row_to_relationship(&row)
    }

    async fn relationships(&self, limit: usize) -> Result<Vec<TestRelationship>> {
        let cypher = format!(
            "MATCH (a:`{label}`)-[r]->(b:`{label}`) \
             RETURN a.name AS from, type(r) AS relationship, b.name AS to \
             LIMIT $limit",
            label = PERSON_LABEL
        );

        let mut result = self
            .graph
            .execute(query(&cypher).param("limit", limit as i64))
            .await
            .map_err(|e| anyhow!("Failed to list relationships: {}", e))?;

        let mut relationships = Vec::new();
        while let Some(row) = result
            .next()
            .await
            .map_err(|e| anyhow!("Failed to iterate: {}", e))?
        {
            relationships.push(row_to_relationship(&row)?);
        }

        Ok(relationships)
    }
}
