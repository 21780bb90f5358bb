//! Core types: test records, store traits, connection lifecycle and errors

pub mod connections;
pub mod error;
pub mod health;
pub mod record;
pub mod service;
pub mod validation;

pub use connections::ConnectionManager;
pub use error::{FoundationError, FoundationResult};
pub use health::{HealthReport, StoreStatus};
pub use record::{RelationshipInput, TestRecord, TestRecordInput, TestRelationship};
pub use service::{DocumentStore, GraphStore, StoreKind};
pub use validation::ValidatedJson;
