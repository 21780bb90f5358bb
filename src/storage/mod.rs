//! Storage implementations for the document and graph datastores

pub mod in_memory;
#[cfg(feature = "mongodb_backend")]
pub mod mongodb;
#[cfg(feature = "neo4j")]
pub mod neo4j;

pub use in_memory::{InMemoryDocumentStore, InMemoryGraphStore};
#[cfg(feature = "mongodb_backend")]
pub use mongodb::MongoDocumentStore;
#[cfg(feature = "neo4j")]
pub use neo4j::Neo4jGraphStore;
