//! End-to-end tests simulating the dashboard against a running backend
//!
//! Each test binds a real server on an ephemeral port and drives it with
//! `DashboardClient`, so the full path from named operation to rendered
//! output is covered.

use gst_foundation::client::render::{render_failure, render_response};
use gst_foundation::prelude::*;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

// =============================================================================
// Helpers
// =============================================================================

struct RunningServer {
    client: DashboardClient,
    connections: AppState,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<anyhow::Result<()>>,
}

impl RunningServer {
    async fn start(connections: ConnectionManager) -> Self {
        let connections: AppState = Arc::new(connections);
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let (tx, rx) = oneshot::channel::<()>();
        let builder = ServerBuilder::new().with_shared_connections(connections.clone());
        let handle = tokio::spawn(async move {
            builder
                .serve_on(listener, async move {
                    let _ = rx.await;
                })
                .await
        });

        let client = DashboardClient::with_timeout(base_url, Duration::from_secs(5))
            .expect("Failed to build client");

        Self {
            client,
            connections,
            shutdown: Some(tx),
            handle,
        }
    }

    async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.handle
            .await
            .expect("server task panicked")
            .expect("server returned an error");
    }
}

fn in_memory_connections() -> ConnectionManager {
    ConnectionManager::new(
        Arc::new(InMemoryDocumentStore::new()),
        Arc::new(InMemoryGraphStore::new()),
    )
    .with_ping_timeout(Duration::from_millis(500))
}

fn unconfigured_connections() -> ConnectionManager {
    ConnectionManager::from_results(
        Err("MONGO_URI is not set".to_string()),
        Err("NEO4J_URI / NEO4J_USER / NEO4J_PASSWORD not fully set".to_string()),
    )
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn test_health_through_client() {
    let server = RunningServer::start(in_memory_connections()).await;

    let report = server.client.health().await.unwrap();
    assert!(report.all_up());

    server.stop().await;
}

#[tokio::test]
async fn test_health_both_down_renders_two_down_lines() {
    let server = RunningServer::start(unconfigured_connections()).await;

    let body = server.client.call(&Operation::Health).await.unwrap();
    assert_eq!(body, json!({"documentStore": "down", "graphStore": "down"}));

    let rendered = render_response(OperationKind::Health, &body);
    assert_eq!(rendered.matches("DOWN").count(), 2);

    server.stop().await;
}

#[tokio::test]
async fn test_document_round_trip_through_client() {
    let server = RunningServer::start(in_memory_connections()).await;

    let created = server
        .client
        .insert_document(TestRecordInput::new("hello"))
        .await
        .unwrap();
    assert_eq!(created.message, "Document inserted successfully.");

    let fetched = server.client.fetch_document(Some(&created.id)).await.unwrap();
    assert_eq!(fetched, created.record);
    assert_eq!(fetched.value, "hello");

    let latest = server.client.fetch_document(None).await.unwrap();
    assert_eq!(latest.id, created.id);

    let recent = server.client.recent_documents(Some(10)).await.unwrap();
    assert_eq!(recent.count, 1);

    server.stop().await;
}

#[tokio::test]
async fn test_node_round_trip_through_named_operations() {
    let server = RunningServer::start(in_memory_connections()).await;

    let create = Operation::from_parts(
        "create-node".parse().unwrap(),
        OperationArgs {
            value: Some("node1".into()),
            name: Some("first".into()),
            ..Default::default()
        },
    )
    .unwrap();
    let body = server.client.call(&create).await.unwrap();
    let id = body["id"].as_str().unwrap().to_string();

    let rendered = render_response(create.kind(), &body);
    assert!(rendered.starts_with("Node created successfully."));

    let fetch = Operation::from_parts(
        OperationKind::FetchNode,
        OperationArgs {
            id: Some(id.clone()),
            ..Default::default()
        },
    )
    .unwrap();
    let node = server.client.call(&fetch).await.unwrap();
    assert_eq!(node["id"], id);
    assert_eq!(node["value"], "node1");
    assert_eq!(node["name"], "first");

    server.stop().await;
}

#[tokio::test]
async fn test_relationships_through_client() {
    let server = RunningServer::start(in_memory_connections()).await;

    let created = server
        .client
        .create_relationship(RelationshipInput::new("Alice", "Bob"))
        .await
        .unwrap();
    assert_eq!(created.message, "Created (Alice)-[:KNOWS]->(Bob)");

    let list = server.client.relationships(None).await.unwrap();
    assert_eq!(list.count, 1);
    assert_eq!(list.relationships[0], created.relationship);

    server.stop().await;
}

#[tokio::test]
async fn test_server_message_is_shown_verbatim() {
    let server = RunningServer::start(unconfigured_connections()).await;

    let err = server
        .client
        .insert_document(TestRecordInput::new("hello"))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(503));
    assert_eq!(err.to_string(), "MongoDB is unavailable: MONGO_URI is not set");
    assert_eq!(
        render_failure(&err),
        "Error (503): MongoDB is unavailable: MONGO_URI is not set"
    );

    server.stop().await;
}

#[tokio::test]
async fn test_not_found_through_client() {
    let server = RunningServer::start(in_memory_connections()).await;

    let err = server
        .client
        .fetch_node(Some("nope"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ClientError::Api { status: 404, ref code, .. } if code.as_deref() == Some("RECORD_NOT_FOUND")
    ));
    assert_eq!(err.to_string(), "Test record 'nope' not found in Neo4j");

    server.stop().await;
}

#[tokio::test]
async fn test_validation_failure_through_client() {
    let server = RunningServer::start(in_memory_connections()).await;

    let err = server
        .client
        .create_node(TestRecordInput::new(""))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(422));
    assert!(err.to_string().contains("value must be 1-200 characters"));

    server.stop().await;
}

#[tokio::test]
async fn test_shutdown_releases_connections() {
    let server = RunningServer::start(in_memory_connections()).await;
    let connections = server.connections.clone();

    assert!(connections.ping_document_store().await);
    server.stop().await;

    assert!(!connections.ping_document_store().await);
    assert!(!connections.ping_graph_store().await);
    assert!(connections.document_store().is_err());
}
