//! Integration tests for the MongoDB document store.
//!
//! # Requirements
//!
//! - Docker must be running (testcontainers launches a MongoDB container)
//! - Feature flag `integration` must be enabled
//!
//! # Running
//!
//! ```sh
//! cargo test --features integration --test mongodb_tests -- --test-threads=1
//! ```
//!
//! # Test isolation
//!
//! All tests share a single MongoDB container (via `OnceLock`). Each test
//! gets its own database name.

#![cfg(feature = "integration")]

use axum::http::StatusCode;
use axum_test::TestServer;
use gst_foundation::prelude::*;
use gst_foundation::storage::mongodb::TEST_COLLECTION;
use std::sync::Arc;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use testcontainers::runners::AsyncRunner;
use testcontainers_modules::mongo::Mongo;

// ---------------------------------------------------------------------------
// Shared test environment (single container, fresh database per test)
// ---------------------------------------------------------------------------

struct MongoTestEnv {
    _container: testcontainers::ContainerAsync<Mongo>,
    connection_url: String,
}

static TEST_ENV: OnceLock<MongoTestEnv> = OnceLock::new();

async fn init_mongo_env() -> &'static MongoTestEnv {
    if let Some(env) = TEST_ENV.get() {
        return env;
    }

    let container = Mongo::default()
        .start()
        .await
        .expect("Failed to start MongoDB container (is Docker running?)");

    let host = container.get_host().await.unwrap();
    let port = container.get_host_port_ipv4(27017).await.unwrap();
    let url = format!("mongodb://{}:{}", host, port);

    let env = MongoTestEnv {
        _container: container,
        connection_url: url,
    };

    let _ = TEST_ENV.set(env);
    TEST_ENV.get().unwrap()
}

static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

async fn mongo_store() -> MongoDocumentStore {
    let env = init_mongo_env().await;
    let db_num = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
    let store = MongoDocumentStore::connect(&env.connection_url, &format!("gst_test_{}", db_num))
        .await
        .expect("Failed to connect to MongoDB");
    store.ensure_indexes().await.expect("Failed to create indexes");
    store
}

// ---------------------------------------------------------------------------
// Store tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_ping() {
    let store = mongo_store().await;
    store.ping().await.unwrap();
}

#[tokio::test]
async fn test_insert_and_get_round_trip() {
    let store = mongo_store().await;
    let record = TestRecord::new(TestRecordInput::new("hello").with_name("test_item"));

    store.insert(record.clone()).await.unwrap();
    let fetched = store.get(&record.id).await.unwrap().unwrap();

    assert_eq!(fetched, record);
}

#[tokio::test]
async fn test_get_unknown_id_is_none() {
    let store = mongo_store().await;
    assert!(store.get("missing").await.unwrap().is_none());
    assert!(store.latest().await.unwrap().is_none());
}

#[tokio::test]
async fn test_duplicate_id_is_rejected() {
    let store = mongo_store().await;
    let record = TestRecord::new(TestRecordInput::new("once"));

    store.insert(record.clone()).await.unwrap();
    assert!(store.insert(record).await.is_err());
}

#[tokio::test]
async fn test_recent_is_newest_first() {
    let store = mongo_store().await;

    for i in 0..4 {
        store
            .insert(TestRecord::new(TestRecordInput::new(format!("v{}", i))))
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let recent = store.recent(2).await.unwrap();
    let values: Vec<&str> = recent.iter().map(|r| r.value.as_str()).collect();
    assert_eq!(values, vec!["v3", "v2"]);

    assert_eq!(store.latest().await.unwrap().unwrap().value, "v3");
}

#[tokio::test]
async fn test_documents_land_in_test_collection() {
    let store = mongo_store().await;
    store
        .insert(TestRecord::new(TestRecordInput::new("counted")))
        .await
        .unwrap();

    let count = store
        .database()
        .collection::<mongodb::bson::Document>(TEST_COLLECTION)
        .count_documents(mongodb::bson::doc! {})
        .await
        .unwrap();
    assert_eq!(count, 1);
}

// ---------------------------------------------------------------------------
// REST tests against a live MongoDB
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_rest_round_trip_against_mongodb() {
    let connections = ConnectionManager::from_results(
        Ok(Arc::new(mongo_store().await) as Arc<dyn DocumentStore>),
        Err("not under test".to_string()),
    );
    let app = ServerBuilder::new()
        .with_connections(connections)
        .build()
        .unwrap();
    let server = TestServer::try_new(app).unwrap();

    let created: Value = server
        .post("/test/mongo")
        .json(&json!({"value": "hello"}))
        .await
        .json();
    let id = created["id"].as_str().unwrap().to_string();

    let response = server.get("/test/mongo").add_query_param("id", &id).await;
    response.assert_status_ok();
    let record: Value = response.json();
    assert_eq!(record["value"], "hello");

    server
        .get("/health")
        .await
        .assert_json(&json!({"documentStore": "up", "graphStore": "down"}));

    server
        .get("/test/mongo")
        .add_query_param("id", "missing")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
