//! Connection lifecycle for the two datastores
//!
//! `ConnectionManager` is constructed once at startup, handed to the router
//! as shared state, and disposed explicitly with [`ConnectionManager::shutdown`].
//! A datastore that cannot be reached at startup does not stop the process:
//! its slot records why, pings report it down, and every request that needs
//! it fails with a connection error.

use crate::config::AppConfig;
use crate::core::error::{ConnectionError, FoundationResult};
use crate::core::service::{DocumentStore, GraphStore, StoreKind};
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// A datastore handle, or the reason there is none
enum Slot<T: ?Sized> {
    Ready(Arc<T>),
    Unavailable(String),
    Closed,
}

impl<T: ?Sized> Clone for Slot<T> {
    fn clone(&self) -> Self {
        match self {
            Slot::Ready(store) => Slot::Ready(store.clone()),
            Slot::Unavailable(reason) => Slot::Unavailable(reason.clone()),
            Slot::Closed => Slot::Closed,
        }
    }
}

impl<T: ?Sized> Slot<T> {
    fn from_result(result: Result<Arc<T>, String>) -> Self {
        match result {
            Ok(store) => Slot::Ready(store),
            Err(reason) => Slot::Unavailable(reason),
        }
    }

    fn handle(&self, kind: StoreKind) -> FoundationResult<Arc<T>> {
        match self {
            Slot::Ready(store) => Ok(store.clone()),
            Slot::Unavailable(reason) => Err(ConnectionError::new(kind, reason.clone()).into()),
            Slot::Closed => Err(ConnectionError::new(kind, "connection has been closed").into()),
        }
    }
}

/// Owner of the document-store and graph-store client handles
///
/// # Example
///
/// ```rust,ignore
/// let connections = Arc::new(ConnectionManager::connect(&config).await);
/// let app = build_router(connections.clone());
/// // ... serve ...
/// connections.shutdown().await;
/// ```
pub struct ConnectionManager {
    document: RwLock<Slot<dyn DocumentStore>>,
    graph: RwLock<Slot<dyn GraphStore>>,
    ping_timeout: Duration,
}

impl ConnectionManager {
    /// Build a manager from ready stores
    pub fn new(document: Arc<dyn DocumentStore>, graph: Arc<dyn GraphStore>) -> Self {
        Self::from_results(Ok(document), Ok(graph))
    }

    /// Build a manager where either store may be missing, with the reason
    pub fn from_results(
        document: Result<Arc<dyn DocumentStore>, String>,
        graph: Result<Arc<dyn GraphStore>, String>,
    ) -> Self {
        Self {
            document: RwLock::new(Slot::from_result(document)),
            graph: RwLock::new(Slot::from_result(graph)),
            ping_timeout: Duration::from_secs(crate::config::DEFAULT_PING_TIMEOUT_SECS),
        }
    }

    /// Override how long a ping may take before the store is reported down
    pub fn with_ping_timeout(mut self, timeout: Duration) -> Self {
        self.ping_timeout = timeout;
        self
    }

    /// Open both datastores from configuration
    ///
    /// Never fails: a missing credential or a failed connection leaves that
    /// slot unavailable and is logged.
    pub async fn connect(config: &AppConfig) -> Self {
        let (document, graph) = tokio::join!(connect_document(config), connect_graph(config));

        match &document {
            Ok(_) => tracing::info!(db = %config.mongo.db_name, "document store client ready"),
            Err(reason) => tracing::warn!(%reason, "document store unavailable"),
        }
        match &graph {
            Ok(_) => tracing::info!("graph store client ready"),
            Err(reason) => tracing::warn!(%reason, "graph store unavailable"),
        }

        Self::from_results(document, graph).with_ping_timeout(config.ping_timeout())
    }

    /// Live document-store handle for route handlers
    pub fn document_store(&self) -> FoundationResult<Arc<dyn DocumentStore>> {
        self.document_slot().handle(StoreKind::Document)
    }

    /// Live graph-store handle for route handlers
    pub fn graph_store(&self) -> FoundationResult<Arc<dyn GraphStore>> {
        self.graph_slot().handle(StoreKind::Graph)
    }

    /// True iff the document store answers a ping within the ping timeout
    pub async fn ping_document_store(&self) -> bool {
        let Ok(store) = self.document_store() else {
            return false;
        };
        self.bounded_ping(StoreKind::Document, store.ping()).await
    }

    /// True iff the graph store answers a ping within the ping timeout
    pub async fn ping_graph_store(&self) -> bool {
        let Ok(store) = self.graph_store() else {
            return false;
        };
        self.bounded_ping(StoreKind::Graph, store.ping()).await
    }

    /// Release both handles
    ///
    /// Safe to call more than once. Afterwards pings report false and the
    /// accessors return a connection error.
    pub async fn shutdown(&self) {
        let document = self.take_document();
        let graph = self.take_graph();

        if let Slot::Ready(store) = document {
            store.close().await;
            tracing::info!("document store connection closed");
        }
        if let Slot::Ready(store) = graph {
            store.close().await;
            tracing::info!("graph store connection closed");
        }
    }

    async fn bounded_ping<F>(&self, kind: StoreKind, ping: F) -> bool
    where
        F: std::future::Future<Output = anyhow::Result<()>>,
    {
        match tokio::time::timeout(self.ping_timeout, ping).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                tracing::warn!(store = %kind, error = %format!("{:#}", e), "ping failed");
                false
            }
            Err(_) => {
                tracing::warn!(store = %kind, timeout = ?self.ping_timeout, "ping timed out");
                false
            }
        }
    }

    // Slots are replaced whole, so a poisoned lock still holds a valid value
    fn document_slot(&self) -> Slot<dyn DocumentStore> {
        match self.document.read() {
            Ok(slot) => slot.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn graph_slot(&self) -> Slot<dyn GraphStore> {
        match self.graph.read() {
            Ok(slot) => slot.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn take_document(&self) -> Slot<dyn DocumentStore> {
        let mut guard = match self.document.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        std::mem::replace(&mut *guard, Slot::Closed)
    }

    fn take_graph(&self) -> Slot<dyn GraphStore> {
        let mut guard = match self.graph.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        std::mem::replace(&mut *guard, Slot::Closed)
    }
}

/// Create a store's indexes in the background.
///
/// Index creation waits on the server, so it never runs on the startup path.
/// A failure is logged and otherwise ignored.
#[cfg(any(feature = "mongodb_backend", feature = "neo4j"))]
fn spawn_index_build<F>(kind: StoreKind, build: F) -> tokio::task::JoinHandle<()>
where
    F: std::future::Future<Output = anyhow::Result<()>> + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(e) = build.await {
            tracing::debug!(store = %kind, error = %format!("{:#}", e), "skipping index creation");
        }
    })
}

#[cfg(feature = "mongodb_backend")]
async fn connect_document(config: &AppConfig) -> Result<Arc<dyn DocumentStore>, String> {
    use crate::storage::MongoDocumentStore;

    let uri = config
        .mongo
        .uri
        .as_deref()
        .ok_or_else(|| "MONGO_URI is not set".to_string())?;

    let store = MongoDocumentStore::connect(uri, &config.mongo.db_name)
        .await
        .map_err(|e| format!("{:#}", e))?;

    let indexer = store.clone();
    spawn_index_build(StoreKind::Document, async move { indexer.ensure_indexes().await });

    let store: Arc<dyn DocumentStore> = Arc::new(store);
    Ok(store)
}

#[cfg(not(feature = "mongodb_backend"))]
async fn connect_document(_config: &AppConfig) -> Result<Arc<dyn DocumentStore>, String> {
    Err("built without the mongodb_backend feature".to_string())
}

#[cfg(feature = "neo4j")]
async fn connect_graph(config: &AppConfig) -> Result<Arc<dyn GraphStore>, String> {
    use crate::storage::Neo4jGraphStore;

    let (uri, user, password) = config
        .neo4j
        .credentials()
        .ok_or_else(|| "NEO4J_URI / NEO4J_USER / NEO4J_PASSWORD not fully set".to_string())?;

    let store = Neo4jGraphStore::connect(uri, user, password)
        .await
        .map_err(|e| format!("{:#}", e))?;

    let indexer = store.clone();
    spawn_index_build(StoreKind::Graph, async move { indexer.ensure_indexes().await });

    let store: Arc<dyn GraphStore> = Arc::new(store);
    Ok(store)
}

#[cfg(not(feature = "neo4j"))]
async fn connect_graph(_config: &AppConfig) -> Result<Arc<dyn GraphStore>, String> {
    Err("built without the neo4j feature".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::FoundationError;
    use crate::core::record::{TestRecord, TestRecordInput, TestRelationship};
    use crate::storage::{InMemoryDocumentStore, InMemoryGraphStore};
    use async_trait::async_trait;

    fn in_memory() -> ConnectionManager {
        ConnectionManager::new(
            Arc::new(InMemoryDocumentStore::new()),
            Arc::new(InMemoryGraphStore::new()),
        )
    }

    /// Graph store whose ping never completes
    struct HangingGraphStore;

    #[async_trait]
    impl GraphStore for HangingGraphStore {
        async fn ping(&self) -> anyhow::Result<()> {
            std::future::pending().await
        }
        async fn create_node(&self, record: TestRecord) -> anyhow::Result<TestRecord> {
            Ok(record)
        }
        async fn get_node(&self, _id: &str) -> anyhow::Result<Option<TestRecord>> {
            Ok(None)
        }
        async fn latest_node(&self) -> anyhow::Result<Option<TestRecord>> {
            Ok(None)
        }
        async fn create_relationship(
            &self,
            rel: TestRelationship,
        ) -> anyhow::Result<TestRelationship> {
            Ok(rel)
        }
        async fn relationships(&self, _limit: usize) -> anyhow::Result<Vec<TestRelationship>> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn test_pings_report_reachable_stores() {
        let manager = in_memory();
        assert!(manager.ping_document_store().await);
        assert!(manager.ping_graph_store().await);
    }

    #[tokio::test]
    async fn test_pings_report_unreachable_stores() {
        let manager = ConnectionManager::new(
            Arc::new(InMemoryDocumentStore::unreachable()),
            Arc::new(InMemoryGraphStore::unreachable()),
        );
        assert!(!manager.ping_document_store().await);
        assert!(!manager.ping_graph_store().await);
    }

    #[tokio::test]
    async fn test_missing_store_reports_reason() {
        let manager = ConnectionManager::from_results(
            Err("MONGO_URI is not set".to_string()),
            Ok(Arc::new(InMemoryGraphStore::new()) as Arc<dyn GraphStore>),
        );

        assert!(!manager.ping_document_store().await);
        assert!(manager.ping_graph_store().await);

        let Err(FoundationError::Connection(err)) = manager.document_store() else {
            panic!("expected a connection error");
        };
        assert_eq!(err.store, StoreKind::Document);
        assert_eq!(err.reason, "MONGO_URI is not set");
    }

    #[tokio::test]
    async fn test_slow_ping_is_reported_down() {
        let manager = ConnectionManager::new(
            Arc::new(InMemoryDocumentStore::new()),
            Arc::new(HangingGraphStore),
        )
        .with_ping_timeout(Duration::from_millis(50));

        assert!(manager.ping_document_store().await);
        assert!(!manager.ping_graph_store().await);
    }

    #[tokio::test]
    async fn test_shutdown_releases_handles() {
        let manager = in_memory();
        let store = manager.document_store().unwrap();
        store
            .insert(TestRecord::new(TestRecordInput::new("before shutdown")))
            .await
            .unwrap();

        manager.shutdown().await;

        assert!(!manager.ping_document_store().await);
        assert!(!manager.ping_graph_store().await);
        assert!(matches!(
            manager.graph_store(),
            Err(FoundationError::Connection(_))
        ));

        // Idempotent
        manager.shutdown().await;
    }

    #[tokio::test]
    async fn test_connect_without_credentials_is_not_fatal() {
        let config = AppConfig::default();
        let manager = ConnectionManager::connect(&config).await;

        assert!(!manager.ping_document_store().await);
        assert!(!manager.ping_graph_store().await);
        assert!(manager.document_store().is_err());
        assert!(manager.graph_store().is_err());
    }

    #[cfg(any(feature = "mongodb_backend", feature = "neo4j"))]
    #[tokio::test]
    async fn test_index_build_does_not_block_caller() {
        let stalled = spawn_index_build(StoreKind::Graph, std::future::pending());
        tokio::task::yield_now().await;
        assert!(!stalled.is_finished());
        stalled.abort();

        let failed = spawn_index_build(StoreKind::Document, async {
            Err(anyhow::anyhow!("server selection timed out"))
        });
        assert!(failed.await.is_ok());
    }
}
