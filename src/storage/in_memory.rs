//! In-memory document and graph stores for testing and development
//!
//! Both stores can be switched "offline" to simulate an unreachable
//! datastore: pings and operations then fail the way a dropped connection
//! would.

use crate::core::record::{TestRecord, TestRelationship};
use crate::core::{DocumentStore, GraphStore};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

fn newest_first(records: &mut [TestRecord]) {
    records.sort_by(|a, b| b.sort_key().cmp(&a.sort_key()));
}

/// In-memory document store
///
/// Uses RwLock for thread-safe access.
#[derive(Clone, Default)]
pub struct InMemoryDocumentStore {
    records: Arc<RwLock<HashMap<String, TestRecord>>>,
    offline: Arc<AtomicBool>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose pings and operations always fail
    pub fn unreachable() -> Self {
        let store = Self::new();
        store.set_offline(true);
        store
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(anyhow!("in-memory document store is offline"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn ping(&self) -> Result<()> {
        self.check_online()
    }

    async fn insert(&self, record: TestRecord) -> Result<TestRecord> {
        self.check_online()?;
        let mut records = self
            .records
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        if records.contains_key(&record.id) {
            return Err(anyhow!("Duplicate key: record '{}' already exists", record.id));
        }
        records.insert(record.id.clone(), record.clone());

        Ok(record)
    }

    async fn get(&self, id: &str) -> Result<Option<TestRecord>> {
        self.check_online()?;
        let records = self
            .records
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(records.get(id).cloned())
    }

    async fn latest(&self) -> Result<Option<TestRecord>> {
        Ok(self.recent(1).await?.into_iter().next())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<TestRecord>> {
        self.check_online()?;
        let records = self
            .records
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        let mut all: Vec<TestRecord> = records.values().cloned().collect();
        newest_first(&mut all);
        all.truncate(limit);
        Ok(all)
    }
}

/// In-memory graph store
#[derive(Clone, Default)]
pub struct InMemoryGraphStore {
    nodes: Arc<RwLock<HashMap<String, TestRecord>>>,
    relationships: Arc<RwLock<Vec<TestRelationship>>>,
    offline: Arc<AtomicBool>,
}

impl InMemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose pings and operations always fail
    pub fn unreachable() -> Self {
        let store = Self::new();
        store.set_offline(true);
        store
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(anyhow!("in-memory graph store is offline"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl GraphStore for InMemoryGraphStore {
    async fn ping(&self) -> Result<()> {
        self.check_online()
    }

    async fn create_node(&self, record: TestRecord) -> Result<TestRecord> {
        self.check_online()?;
        let mut nodes = self
            .nodes
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        // MERGE semantics: same id overwrites
        nodes.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn get_node(&self, id: &str) -> Result<Option<TestRecord>> {
        self.check_online()?;
        let nodes = self
            .nodes
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(nodes.get(id).cloned())
    }

    async fn latest_node(&self) -> Result<Option<TestRecord>> {
        self.check_online()?;
        let nodes = self
            .nodes
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(nodes.values().max_by_key(|n| n.sort_key()).cloned())
    }

    async fn create_relationship(&self, rel: TestRelationship) -> Result<TestRelationship> {
        self.check_online()?;
        let mut relationships = self
            .relationships
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        if !relationships.contains(&rel) {
            relationships.push(rel.clone());
        }
        Ok(rel)
    }

    async fn relationships(&self, limit: usize) -> Result<Vec<TestRelationship>> {
        self.check_online()?;
        let relationships = self
            .relationships
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(relationships.iter().take(limit).cloned().collect())
    }
}
