//! # GST Foundation
//!
//! Connectivity scaffold for a MongoDB document store and a Neo4j graph
//! store, exposed over HTTP and driven by a terminal dashboard.
//!
//! ## Features
//!
//! - **Connection Manager**: owns both datastore handles, pings them within a
//!   bounded window and releases them on shutdown
//! - **Smoke-test routes**: write a test record to each store and read it back
//! - **Health route**: `up` / `down` per store, always `200`
//! - **Dashboard client**: named operations over the routes, rendered for a terminal
//! - **In-memory stores**: run and test the whole surface without datastores
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use gst_foundation::prelude::*;
//!
//! let config = AppConfig::from_env()?;
//! let connections = ConnectionManager::connect(&config).await;
//!
//! ServerBuilder::new()
//!     .with_connections(connections)
//!     .serve(&config.server.addr())
//!     .await?;
//! ```

pub mod client;
pub mod config;
pub mod core;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        ConnectionManager, FoundationError, FoundationResult, HealthReport, RelationshipInput,
        StoreKind, StoreStatus, TestRecord, TestRecordInput, TestRelationship, ValidatedJson,
        service::{DocumentStore, GraphStore},
    };

    // === Configuration ===
    pub use crate::config::{AppConfig, MongoConfig, Neo4jConfig, ServerConfig};

    // === Server ===
    pub use crate::server::{AppState, ServerBuilder, build_router};

    // === Storage ===
    pub use crate::storage::{InMemoryDocumentStore, InMemoryGraphStore};

    #[cfg(feature = "mongodb_backend")]
    pub use crate::storage::MongoDocumentStore;

    #[cfg(feature = "neo4j")]
    pub use crate::storage::Neo4jGraphStore;

    // === Client ===
    pub use crate::client::{ClientError, DashboardClient, Operation, OperationArgs, OperationKind};

    // === External re-exports ===
    pub use async_trait::async_trait;
    pub use axum::Router;
    pub use serde::{Deserialize, Serialize};
    pub use serde_json::{Value, json};
}
