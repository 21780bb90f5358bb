//! Test records and the request shapes that create them

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use uuid::Uuid;
use validator::Validate;

/// Default relationship type for the relationship smoke test
pub const DEFAULT_RELATIONSHIP: &str = "KNOWS";

/// Upper bound on list endpoints
pub const MAX_LIST_LIMIT: usize = 50;

/// The transient record written to a datastore to prove connectivity
///
/// A record is written once, read back once, and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub value: String,
    pub created_at: DateTime<Utc>,
}

impl TestRecord {
    /// Build a fresh record with a generated id and the current timestamp
    pub fn new(input: TestRecordInput) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: input.name,
            value: input.value,
            created_at: Utc::now(),
        }
    }

    /// Numeric ordering key persisted next to the record
    ///
    /// RFC 3339 strings with variable fractional digits do not sort
    /// lexicographically, so stores order on this instead.
    pub fn sort_key(&self) -> i64 {
        self.created_at.timestamp_micros()
    }
}

/// Write payload for the document and graph smoke tests
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TestRecordInput {
    #[serde(default, alias = "label", skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 200, message = "value must be 1-200 characters"))]
    pub value: String,
}

impl TestRecordInput {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            name: None,
            value: value.into(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// A relationship between two `Person` nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestRelationship {
    pub from: String,
    pub relationship: String,
    pub to: String,
}

/// Write payload for the relationship smoke test
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RelationshipInput {
    #[serde(alias = "node1_name")]
    #[validate(length(min = 1, max = 100, message = "from must be 1-100 characters"))]
    pub from: String,

    #[serde(alias = "node2_name")]
    #[validate(length(min = 1, max = 100, message = "to must be 1-100 characters"))]
    pub to: String,

    #[serde(default = "default_relationship")]
    #[validate(custom(function = "validate_relationship_type"))]
    pub relationship: String,
}

impl RelationshipInput {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            relationship: default_relationship(),
        }
    }

    pub fn with_relationship(mut self, relationship: impl Into<String>) -> Self {
        self.relationship = relationship.into();
        self
    }

    /// Normalise into the stored shape; relationship types are upper-cased
    pub fn into_relationship(self) -> TestRelationship {
        TestRelationship {
            from: self.from,
            relationship: self.relationship.to_uppercase(),
            to: self.to,
        }
    }
}

fn default_relationship() -> String {
    DEFAULT_RELATIONSHIP.to_string()
}

/// Relationship types are interpolated into Cypher, so only identifier
/// characters are accepted.
fn relationship_type_regex() -> &'static Regex {
    static RELATIONSHIP_TYPE: OnceLock<Regex> = OnceLock::new();
    RELATIONSHIP_TYPE.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{0,49}$").expect("relationship type pattern is valid")
    })
}

pub fn is_valid_relationship_type(value: &str) -> bool {
    relationship_type_regex().is_match(value)
}

fn validate_relationship_type(value: &str) -> Result<(), validator::ValidationError> {
    if is_valid_relationship_type(value) {
        Ok(())
    } else {
        let mut err = validator::ValidationError::new("relationship_type");
        err.message = Some(
            "relationship must start with a letter or underscore and contain only letters, digits and underscores (max 50)"
                .into(),
        );
        Err(err)
    }
}

/// Query string for the read routes: `?id=<id>`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordQuery {
    pub id: Option<String>,
}

/// Query string for the list routes: `?limit=<n>`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
}

impl ListQuery {
    /// Requested limit clamped to `1..=MAX_LIST_LIMIT`
    pub fn effective_limit(&self) -> usize {
        self.limit.unwrap_or(MAX_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT)
    }
}

/// Response body of the write routes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteResponse {
    pub id: String,
    pub message: String,
    pub record: TestRecord,
}

/// Response body of `GET /test/mongo/recent`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordList {
    pub count: usize,
    pub records: Vec<TestRecord>,
}

/// Response body of `POST /test/neo4j/relationship`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipResponse {
    pub message: String,
    pub relationship: TestRelationship,
}

/// Response body of `GET /test/neo4j/relationships`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipList {
    pub count: usize,
    pub relationships: Vec<TestRelationship>,
}
